//! Dashboard session: the per-session owner of one sales aggregator.
//!
//! A session is created when the dashboard starts, handed to whatever needs
//! it (the HTTP host keeps it behind a mutex in router state) and dropped
//! when the dashboard goes away. All recorded sales and alert
//! acknowledgements die with it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::application::alert_board::AlertBoard;
use crate::config::AnalyticsConfig;
use crate::domain::entities::alert::Alert;
use crate::domain::entities::sale::SaleEvent;
use crate::domain::services::clock::{Clock, SystemClock};
use crate::domain::services::export::ExportData;
use crate::domain::services::listeners::ListenerId;
use crate::domain::services::metrics::{CategoryMetrics, HourlyMetrics, ProductMetrics, SalesMetrics};
use crate::domain::services::period::Period;
use crate::domain::services::SalesAnalytics;

/// Session shared between request handlers and background tasks
pub type SharedSession = Arc<Mutex<DashboardSession>>;

#[derive(Debug)]
pub struct DashboardSession {
    analytics: SalesAnalytics,
    alert_board: AlertBoard,
    top_products_limit: usize,
    started_at: DateTime<Utc>,
}

impl DashboardSession {
    pub fn new(config: &AnalyticsConfig, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now().with_timezone(&Utc);
        info!(
            "Dashboard session started (low sales < {}, low margin < {:.1}%)",
            config.alert_thresholds.low_sales_threshold,
            config.alert_thresholds.low_margin_threshold
        );

        Self {
            analytics: SalesAnalytics::new(config.alert_thresholds.clone(), clock),
            alert_board: AlertBoard::new(),
            top_products_limit: config.top_products_limit,
            started_at,
        }
    }

    pub fn with_system_clock(config: &AnalyticsConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn add_sale(&mut self, event: SaleEvent) {
        self.analytics.add_sale(event);
    }

    pub fn metrics(&self, period: Period) -> SalesMetrics {
        self.analytics.metrics(period)
    }

    /// Best sellers; `None` uses the configured default size
    pub fn top_products(&self, limit: Option<usize>) -> Vec<ProductMetrics> {
        self.analytics
            .top_products(limit.unwrap_or(self.top_products_limit))
    }

    pub fn category_metrics(&self) -> Vec<CategoryMetrics> {
        self.analytics.category_metrics()
    }

    pub fn hourly_metrics(&self) -> Vec<HourlyMetrics> {
        self.analytics.hourly_metrics()
    }

    /// Current alerts with this session's acknowledgements applied
    pub fn alerts(&self, unacknowledged_only: bool) -> Vec<Alert> {
        self.alert_board
            .apply(self.analytics.alerts(), unacknowledged_only)
    }

    pub fn acknowledge_alert(&mut self, alert_id: &str) -> bool {
        self.alert_board.acknowledge(alert_id)
    }

    pub fn dismiss_alert(&mut self, alert_id: &str) -> bool {
        self.alert_board.dismiss(alert_id)
    }

    /// Forget acknowledgements and dismissals. Alerts themselves are derived
    /// and reappear while their condition holds.
    pub fn clear_alerts(&mut self) {
        self.alert_board.clear();
    }

    pub fn export_data(&self) -> ExportData {
        self.analytics.export_data()
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&SaleEvent) + Send + Sync + 'static,
    {
        self.analytics.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.analytics.remove_listener(id)
    }

    pub fn add_alert_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&[Alert]) + Send + Sync + 'static,
    {
        self.analytics.add_alert_listener(listener)
    }

    pub fn remove_alert_listener(&mut self, id: ListenerId) -> bool {
        self.analytics.remove_alert_listener(id)
    }

    pub fn analytics(&self) -> &SalesAnalytics {
        &self.analytics
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
