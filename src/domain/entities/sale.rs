use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Largest quantity accepted on a single line item
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// One line of a completed sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: i64,
    /// Unit selling price
    pub price: f64,
    /// Unit cost, when the checkout flow knows it
    #[serde(default)]
    pub cost: Option<f64>,
}

impl SaleItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, price: f64, cost: Option<f64>) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: None,
            category: None,
            quantity,
            price,
            cost,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// price × quantity
    pub fn revenue(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// (price − cost) × quantity, or `None` when the cost is unknown
    pub fn profit(&self) -> Option<f64> {
        self.cost
            .map(|cost| (self.price - cost) * self.quantity as f64)
    }
}

/// A completed point-of-sale transaction.
///
/// `total` is what the customer was charged and is trusted as-is for revenue
/// figures. It is never reconciled against the line items, so discounts
/// applied at checkout show up in revenue but not in the per-product
/// breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub total: f64,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier_id: Option<String>,
}

impl SaleEvent {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, total: f64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            total,
            items: Vec::new(),
            payment_method: None,
            cashier_id: None,
        }
    }

    pub fn with_item(mut self, item: SaleItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn paid_with(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    pub fn rung_up_by(mut self, cashier_id: impl Into<String>) -> Self {
        self.cashier_id = Some(cashier_id.into());
        self
    }

    /// Profit over the line items that carry a cost
    pub fn profit(&self) -> f64 {
        self.items.iter().filter_map(SaleItem::profit).sum()
    }

    pub fn has_cost_data(&self) -> bool {
        self.items.iter().any(|item| item.cost.is_some())
    }

    /// Check monetary fields and quantities.
    ///
    /// The aggregator records events regardless of the outcome; callers at
    /// the edge (the HTTP host) use this to reject bad input up front.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptySaleId);
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(ValidationError::InvalidTotal {
                sale_id: self.id.clone(),
                value: self.total,
            });
        }

        for (line, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                return Err(ValidationError::EmptyProductId {
                    sale_id: self.id.clone(),
                    line,
                });
            }
            if item.quantity < 1 {
                return Err(ValidationError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    value: item.quantity,
                });
            }
            if item.quantity > MAX_LINE_QUANTITY {
                return Err(ValidationError::QuantityTooLarge {
                    product_id: item.product_id.clone(),
                    value: item.quantity,
                    max: MAX_LINE_QUANTITY,
                });
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(ValidationError::InvalidPrice {
                    product_id: item.product_id.clone(),
                    value: item.price,
                });
            }
            if let Some(cost) = item.cost {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(ValidationError::InvalidCost {
                        product_id: item.product_id.clone(),
                        value: cost,
                    });
                }
            }
        }

        Ok(())
    }
}
