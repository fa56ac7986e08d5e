use std::collections::HashSet;

use crate::domain::entities::alert::Alert;

/// Caller-side bookkeeping for alerts the user has acknowledged or dismissed.
///
/// The aggregator re-derives alerts on every query and never stores them;
/// this board remembers what the user did with each alert id.
#[derive(Debug, Clone, Default)]
pub struct AlertBoard {
    acknowledged: HashSet<String>,
    dismissed: HashSet<String>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the alert was not already acknowledged
    pub fn acknowledge(&mut self, alert_id: &str) -> bool {
        self.acknowledged.insert(alert_id.to_string())
    }

    /// Hide an alert for the rest of the session
    pub fn dismiss(&mut self, alert_id: &str) -> bool {
        self.dismissed.insert(alert_id.to_string())
    }

    pub fn is_acknowledged(&self, alert_id: &str) -> bool {
        self.acknowledged.contains(alert_id)
    }

    pub fn is_dismissed(&self, alert_id: &str) -> bool {
        self.dismissed.contains(alert_id)
    }

    /// Drop dismissed alerts, flag acknowledged ones, and optionally keep
    /// only those still needing attention.
    pub fn apply(&self, alerts: Vec<Alert>, unacknowledged_only: bool) -> Vec<Alert> {
        alerts
            .into_iter()
            .filter(|alert| !self.is_dismissed(&alert.id))
            .map(|mut alert| {
                alert.acknowledged = self.is_acknowledged(&alert.id);
                alert
            })
            .filter(|alert| !(unacknowledged_only && alert.acknowledged))
            .collect()
    }

    pub fn clear(&mut self) {
        self.acknowledged.clear();
        self.dismissed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::alert::{AlertKind, AlertSeverity};
    use chrono::NaiveDate;

    fn alerts() -> Vec<Alert> {
        let day = NaiveDate::from_ymd_opt(2026, 6, 17).unwrap();
        vec![
            Alert::new(AlertKind::LowSales, AlertSeverity::Warning, day, "Low sales", "m"),
            Alert::new(AlertKind::LowMargin, AlertSeverity::Critical, day, "Low margin", "m"),
        ]
    }

    #[test]
    fn test_acknowledged_alerts_are_flagged() {
        let mut board = AlertBoard::new();
        assert!(board.acknowledge("low_sales:2026-06-17"));
        assert!(!board.acknowledge("low_sales:2026-06-17"));

        let result = board.apply(alerts(), false);
        assert_eq!(result.len(), 2);
        assert!(result[0].acknowledged);
        assert!(!result[1].acknowledged);

        let pending = board.apply(alerts(), true);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, AlertKind::LowMargin);
    }

    #[test]
    fn test_dismissed_alerts_are_hidden() {
        let mut board = AlertBoard::new();
        board.dismiss("low_margin:2026-06-17");

        let result = board.apply(alerts(), false);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, AlertKind::LowSales);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut board = AlertBoard::new();
        board.acknowledge("low_sales:2026-06-17");
        board.dismiss("low_margin:2026-06-17");
        board.clear();

        let result = board.apply(alerts(), true);
        assert_eq!(result.len(), 2);
    }
}
