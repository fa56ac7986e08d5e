use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::services::alert_rules::AlertThresholds;

/// Runtime configuration for the analytics session and its HTTP host
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub alert_thresholds: AlertThresholds,
    pub top_products_limit: usize, // Default size of the best-sellers list
    pub refresh_interval: Duration, // How often the host re-derives alerts
    pub bind_address: SocketAddr,
    pub max_request_body_bytes: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            alert_thresholds: AlertThresholds::default(),
            top_products_limit: 10,
            refresh_interval: Duration::from_secs(30),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_request_body_bytes: 64 * 1024,
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    ///
    /// Values that fail to parse or fall outside their range are logged and
    /// the default is kept.
    pub fn from_env() -> AnalyticsConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AnalyticsConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AnalyticsConfig::default();

        if let Some(threshold) = lookup("LOW_SALES_THRESHOLD") {
            match threshold.parse::<usize>() {
                Ok(value) if value <= 10_000 => {
                    config.alert_thresholds.low_sales_threshold = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid LOW_SALES_THRESHOLD value: {} (must be at most 10000), using default: {}",
                        value, config.alert_thresholds.low_sales_threshold
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse LOW_SALES_THRESHOLD '{}': {}, using default: {}",
                        threshold,
                        e,
                        config.alert_thresholds.low_sales_threshold
                    );
                }
            }
        }

        if let Some(margin) = lookup("LOW_MARGIN_THRESHOLD") {
            match margin.parse::<f64>() {
                Ok(value) if (0.0..=100.0).contains(&value) => {
                    config.alert_thresholds.low_margin_threshold = value;
                }
                _ => {
                    tracing::warn!(
                        "Invalid LOW_MARGIN_THRESHOLD '{}' (must be between 0 and 100), using default: {}",
                        margin, config.alert_thresholds.low_margin_threshold
                    );
                }
            }
        }

        if let Some(critical) = lookup("CRITICAL_MARGIN_THRESHOLD") {
            match critical.parse::<f64>() {
                Ok(value)
                    if value >= 0.0 && value <= config.alert_thresholds.low_margin_threshold =>
                {
                    config.alert_thresholds.critical_margin_threshold = value;
                }
                _ => {
                    tracing::warn!(
                        "Invalid CRITICAL_MARGIN_THRESHOLD '{}' (must be between 0 and {}), using default: {}",
                        critical,
                        config.alert_thresholds.low_margin_threshold,
                        config.alert_thresholds.critical_margin_threshold
                    );
                }
            }
        }

        // A lowered warning margin must not sit below the critical one.
        if config.alert_thresholds.critical_margin_threshold
            > config.alert_thresholds.low_margin_threshold
        {
            config.alert_thresholds.critical_margin_threshold =
                config.alert_thresholds.low_margin_threshold;
        }

        if let Some(limit) = lookup("TOP_PRODUCTS_LIMIT") {
            match limit.parse::<usize>() {
                Ok(value) if (1..=100).contains(&value) => {
                    config.top_products_limit = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid TOP_PRODUCTS_LIMIT value: {} (must be between 1 and 100), using default: {}",
                        value, config.top_products_limit
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse TOP_PRODUCTS_LIMIT '{}': {}, using default: {}",
                        limit,
                        e,
                        config.top_products_limit
                    );
                }
            }
        }

        if let Some(interval) = lookup("REFRESH_INTERVAL_SECONDS") {
            match interval.parse::<u64>() {
                Ok(value) if (5..=3600).contains(&value) => {
                    config.refresh_interval = Duration::from_secs(value);
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid REFRESH_INTERVAL_SECONDS value: {} (must be between 5 and 3600), using default: {}s",
                        value,
                        config.refresh_interval.as_secs()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse REFRESH_INTERVAL_SECONDS '{}': {}, using default: {}s",
                        interval,
                        e,
                        config.refresh_interval.as_secs()
                    );
                }
            }
        }

        if let Some(addr) = lookup("BIND_ADDRESS") {
            match addr.parse::<SocketAddr>() {
                Ok(value) => config.bind_address = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse BIND_ADDRESS '{}': {}, using default: {}",
                        addr,
                        e,
                        config.bind_address
                    );
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.alert_thresholds.low_sales_threshold, 5);
        assert_eq!(config.alert_thresholds.low_margin_threshold, 20.0);
        assert_eq!(config.top_products_limit, 10);
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.bind_address.port(), 3000);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AnalyticsConfig::from_lookup(lookup_from(&[
            ("LOW_SALES_THRESHOLD", "12"),
            ("LOW_MARGIN_THRESHOLD", "35.5"),
            ("CRITICAL_MARGIN_THRESHOLD", "10"),
            ("TOP_PRODUCTS_LIMIT", "25"),
            ("REFRESH_INTERVAL_SECONDS", "60"),
            ("BIND_ADDRESS", "0.0.0.0:8080"),
        ]));

        assert_eq!(config.alert_thresholds.low_sales_threshold, 12);
        assert_eq!(config.alert_thresholds.low_margin_threshold, 35.5);
        assert_eq!(config.alert_thresholds.critical_margin_threshold, 10.0);
        assert_eq!(config.top_products_limit, 25);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.bind_address.port(), 8080);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = AnalyticsConfig::from_lookup(lookup_from(&[
            ("LOW_SALES_THRESHOLD", "many"),
            ("LOW_MARGIN_THRESHOLD", "150"),
            ("TOP_PRODUCTS_LIMIT", "0"),
            ("REFRESH_INTERVAL_SECONDS", "1"),
            ("BIND_ADDRESS", "localhost"),
        ]));

        let defaults = AnalyticsConfig::default();
        assert_eq!(config.alert_thresholds, defaults.alert_thresholds);
        assert_eq!(config.top_products_limit, defaults.top_products_limit);
        assert_eq!(config.refresh_interval, defaults.refresh_interval);
        assert_eq!(config.bind_address, defaults.bind_address);

        let config = AnalyticsConfig::from_lookup(lookup_from(&[
            ("TOP_PRODUCTS_LIMIT", "abc"),
            ("REFRESH_INTERVAL_SECONDS", "soon"),
            ("CRITICAL_MARGIN_THRESHOLD", "-1"),
        ]));
        assert_eq!(config.top_products_limit, defaults.top_products_limit);
        assert_eq!(config.refresh_interval, defaults.refresh_interval);
        assert_eq!(config.alert_thresholds, defaults.alert_thresholds);

        let config = AnalyticsConfig::from_lookup(lookup_from(&[
            ("TOP_PRODUCTS_LIMIT", "500"),
            ("REFRESH_INTERVAL_SECONDS", "99999"),
        ]));
        assert_eq!(config.top_products_limit, defaults.top_products_limit);
        assert_eq!(config.refresh_interval, defaults.refresh_interval);
    }

    #[test]
    fn test_critical_margin_follows_lowered_warning_margin() {
        let config = AnalyticsConfig::from_lookup(lookup_from(&[("LOW_MARGIN_THRESHOLD", "2")]));
        assert_eq!(config.alert_thresholds.low_margin_threshold, 2.0);
        assert_eq!(config.alert_thresholds.critical_margin_threshold, 2.0);
    }
}
