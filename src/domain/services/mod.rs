pub mod alert_rules;
pub mod clock;
pub mod export;
pub mod listeners;
pub mod metrics;
pub mod period;
pub mod sales_analytics;

pub use sales_analytics::SalesAnalytics;
