use chrono::NaiveDate;

use crate::domain::entities::alert::{Alert, AlertKind, AlertSeverity};
use crate::domain::services::metrics::WindowTotals;

/// Thresholds for the alert rules
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// Fewer sales than this today raises `low_sales`
    pub low_sales_threshold: usize,
    /// Margin (percent) below which `low_margin` is raised
    pub low_margin_threshold: f64,
    /// Margin (percent) below which `low_margin` becomes critical
    pub critical_margin_threshold: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_sales_threshold: 5,
            low_margin_threshold: 20.0,
            critical_margin_threshold: 5.0,
        }
    }
}

impl AlertThresholds {
    /// Evaluate every rule against today's totals.
    ///
    /// `has_history` is false when no sale has ever been recorded; the
    /// low-sales rule still fires then, but only as `info`.
    pub fn check_alerts(&self, day: NaiveDate, today: &WindowTotals, has_history: bool) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(alert) = self.check_low_sales(day, today, has_history) {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_low_margin(day, today) {
            alerts.push(alert);
        }

        alerts
    }

    fn check_low_sales(&self, day: NaiveDate, today: &WindowTotals, has_history: bool) -> Option<Alert> {
        if today.sales >= self.low_sales_threshold {
            return None;
        }

        let (severity, message) = if has_history {
            (
                AlertSeverity::Warning,
                format!(
                    "Only {} sales today (expected at least {})",
                    today.sales, self.low_sales_threshold
                ),
            )
        } else {
            (
                AlertSeverity::Info,
                "No sales recorded yet this session".to_string(),
            )
        };

        Some(
            Alert::new(AlertKind::LowSales, severity, day, "Low sales", message).with_metadata(
                serde_json::json!({
                    "sales": today.sales,
                    "threshold": self.low_sales_threshold,
                    "revenue": today.revenue,
                }),
            ),
        )
    }

    fn check_low_margin(&self, day: NaiveDate, today: &WindowTotals) -> Option<Alert> {
        if !today.has_cost_data {
            return None;
        }

        let margin = today.profit_margin();
        if margin >= self.low_margin_threshold {
            return None;
        }

        let severity = if margin < self.critical_margin_threshold {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };

        Some(
            Alert::new(
                AlertKind::LowMargin,
                severity,
                day,
                "Low profit margin",
                format!(
                    "Profit margin today is {:.1}% (threshold: {:.1}%)",
                    margin, self.low_margin_threshold
                ),
            )
            .with_metadata(serde_json::json!({
                "margin": margin,
                "threshold": self.low_margin_threshold,
                "profit": today.profit,
                "revenue": today.revenue,
            })),
        )
    }
}
