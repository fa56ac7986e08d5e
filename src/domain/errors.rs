use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Sale id must not be empty")]
    EmptySaleId,

    #[error("Product id must not be empty (sale {sale_id}, line {line})")]
    EmptyProductId { sale_id: String, line: usize },

    #[error("Invalid total for sale {sale_id}: {value}")]
    InvalidTotal { sale_id: String, value: f64 },

    #[error("Invalid price for {product_id}: {value}")]
    InvalidPrice { product_id: String, value: f64 },

    #[error("Invalid cost for {product_id}: {value}")]
    InvalidCost { product_id: String, value: f64 },

    #[error("Quantity must be at least 1 for {product_id}, got {value}")]
    InvalidQuantity { product_id: String, value: i64 },

    #[error("Quantity for {product_id} exceeds {max}, got {value}")]
    QuantityTooLarge { product_id: String, value: i64, max: i64 },

    #[error("Unknown period: {0} (expected today, week or month)")]
    UnknownPeriod(String),
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export failed: {0}")]
    Export(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidQuantity {
            product_id: "sku-1".to_string(),
            value: 0,
        };
        assert_eq!(err.to_string(), "Quantity must be at least 1 for sku-1, got 0");

        let err = ValidationError::UnknownPeriod("year".to_string());
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn test_export_error_message() {
        let err = AnalyticsError::Export("writer closed".to_string());
        assert_eq!(err.to_string(), "Export failed: writer closed");
    }
}
