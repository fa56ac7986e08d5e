use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::alert::Alert;
use crate::domain::entities::sale::SaleEvent;
use crate::domain::services::alert_rules::AlertThresholds;
use crate::domain::services::clock::Clock;
use crate::domain::services::export::ExportData;
use crate::domain::services::listeners::{ListenerId, Listeners};
use crate::domain::services::metrics::{
    category_breakdown, hourly_breakdown, rank_products, CategoryMetrics, HourlyMetrics,
    ProductMetrics, SalesMetrics, WindowTotals,
};
use crate::domain::services::period::{Period, TimeWindow};

/// In-memory sales aggregator.
///
/// Keeps an append-only list of sale events for its own lifetime and answers
/// every query by recomputing from that list. Nothing is cached and nothing
/// is persisted, so each `metrics`/`alerts`/... call is a pure function of
/// the recorded sales and the clock.
pub struct SalesAnalytics {
    clock: Arc<dyn Clock>,
    thresholds: AlertThresholds,
    sales: Vec<SaleEvent>,
    sale_listeners: Listeners<SaleEvent>,
    alert_listeners: Listeners<[Alert]>,
}

impl SalesAnalytics {
    pub fn new(thresholds: AlertThresholds, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            thresholds,
            sales: Vec::new(),
            sale_listeners: Listeners::new(),
            alert_listeners: Listeners::new(),
        }
    }

    /// Record a completed sale and notify subscribers.
    ///
    /// Events are never rejected or deduplicated. Sale listeners receive the
    /// event; alert listeners then receive the recomputed alert list when it
    /// is non-empty.
    pub fn add_sale(&mut self, event: SaleEvent) {
        if let Err(e) = event.validate() {
            warn!("Recording suspicious sale {}: {}", event.id, e);
        }

        debug!(
            "Recorded sale {} (total {:.2}, {} items)",
            event.id,
            event.total,
            event.items.len()
        );
        self.sales.push(event);

        if let Some(recorded) = self.sales.last() {
            self.sale_listeners.notify(recorded);
        }

        if !self.alert_listeners.is_empty() {
            let alerts = self.alerts();
            if !alerts.is_empty() {
                self.alert_listeners.notify(&alerts);
            }
        }
    }

    pub fn metrics(&self, period: Period) -> SalesMetrics {
        let now = self.clock.now();
        let current = self.totals_in(period.window(now));
        let previous = self.totals_in(period.previous_window(now));
        SalesMetrics::compare(period, &current, &previous)
    }

    /// Best sellers by revenue over the whole history
    pub fn top_products(&self, limit: usize) -> Vec<ProductMetrics> {
        let mut ranked = rank_products(&self.sales);
        ranked.truncate(limit);
        ranked
    }

    pub fn category_metrics(&self) -> Vec<CategoryMetrics> {
        category_breakdown(&self.sales)
    }

    /// Today's revenue per local hour, 24 entries
    pub fn hourly_metrics(&self) -> Vec<HourlyMetrics> {
        let today = Period::Today.window(self.clock.now());
        hourly_breakdown(self.sales.iter().filter(|sale| today.contains(sale.timestamp)))
    }

    /// Alerts derived from today's sales. None are acknowledged.
    pub fn alerts(&self) -> Vec<Alert> {
        let now = self.clock.now();
        let today = self.totals_in(Period::Today.window(now));
        self.thresholds
            .check_alerts(now.date_naive(), &today, !self.sales.is_empty())
    }

    pub fn export_data(&self) -> ExportData {
        ExportData {
            sales: self.sales.clone(),
            metrics: self.metrics(Period::Today),
            exported_at: self.clock.now().with_timezone(&Utc),
        }
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&SaleEvent) + Send + Sync + 'static,
    {
        self.sale_listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.sale_listeners.remove(id)
    }

    pub fn add_alert_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&[Alert]) + Send + Sync + 'static,
    {
        self.alert_listeners.add(listener)
    }

    pub fn remove_alert_listener(&mut self, id: ListenerId) -> bool {
        self.alert_listeners.remove(id)
    }

    pub fn sales(&self) -> &[SaleEvent] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    fn totals_in(&self, window: TimeWindow) -> WindowTotals {
        self.sales
            .iter()
            .filter(|sale| window.contains(sale.timestamp))
            .collect()
    }
}

impl std::fmt::Debug for SalesAnalytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesAnalytics")
            .field("sales", &self.sales.len())
            .field("thresholds", &self.thresholds)
            .field("sale_listeners", &self.sale_listeners)
            .field("alert_listeners", &self.alert_listeners)
            .finish()
    }
}
