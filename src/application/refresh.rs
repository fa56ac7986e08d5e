use std::time::Duration;
use tracing::{debug, info, warn};

use crate::application::session::{DashboardSession, SharedSession};
use crate::domain::entities::alert::{Alert, AlertSeverity};
use crate::domain::services::metrics::SalesMetrics;
use crate::domain::services::period::Period;

/// What one refresh tick observed
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub today: SalesMetrics,
    pub pending_alerts: Vec<Alert>,
}

/// Re-derive today's metrics and the unacknowledged alerts, logging both
pub fn refresh_once(session: &DashboardSession) -> RefreshReport {
    let today = session.metrics(Period::Today);
    let pending_alerts = session.alerts(true);

    debug!(
        "Today: {} sales, revenue {:.2}, margin {:.1}%",
        today.total_sales, today.total_revenue, today.profit_margin
    );

    for alert in &pending_alerts {
        match alert.severity {
            AlertSeverity::Critical | AlertSeverity::Warning => {
                warn!("[{}] {}: {}", alert.kind, alert.title, alert.message)
            }
            AlertSeverity::Info => info!("[{}] {}: {}", alert.kind, alert.title, alert.message),
        }
    }

    RefreshReport {
        today,
        pending_alerts,
    }
}

/// Background task that refreshes on a fixed interval until the runtime stops
pub async fn run_refresh_loop(session: SharedSession, every: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;
        let session = session.lock().await;
        refresh_once(&session);
    }
}
