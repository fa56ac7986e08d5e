use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::entities::sale::SaleEvent;
use crate::domain::services::period::Period;

/// Category name used for line items without one
pub const UNCATEGORIZED: &str = "uncategorized";

/// Running totals for the sales inside one time window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowTotals {
    /// Sum of sale totals
    pub revenue: f64,
    /// Sum of (price − cost) × quantity over line items with a known cost
    pub profit: f64,
    pub sales: usize,
    /// Whether any line item in the window carried a cost
    pub has_cost_data: bool,
}

impl WindowTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sale(&mut self, sale: &SaleEvent) {
        self.sales += 1;
        self.revenue += sale.total;
        self.profit += sale.profit();
        self.has_cost_data |= sale.has_cost_data();
    }

    pub fn average_ticket(&self) -> f64 {
        if self.sales == 0 {
            return 0.0;
        }
        self.revenue / self.sales as f64
    }

    /// Profit as a percentage of revenue, 0 when there is no revenue
    pub fn profit_margin(&self) -> f64 {
        if self.revenue == 0.0 {
            return 0.0;
        }
        self.profit * 100.0 / self.revenue
    }
}

impl<'a> FromIterator<&'a SaleEvent> for WindowTotals {
    fn from_iter<I: IntoIterator<Item = &'a SaleEvent>>(iter: I) -> Self {
        let mut totals = WindowTotals::new();
        for sale in iter {
            totals.record_sale(sale);
        }
        totals
    }
}

/// Headline figures for a period, compared with the period before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub period: Period,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub total_sales: usize,
    pub average_ticket: f64,
    /// Percentage (40.0 means 40%)
    pub profit_margin: f64,
    /// Percent change of revenue against the previous window
    pub revenue_change: f64,
    pub sales_change: f64,
    pub profit_change: f64,
}

impl SalesMetrics {
    pub fn compare(period: Period, current: &WindowTotals, previous: &WindowTotals) -> Self {
        // No baseline (or nothing to compare) means no change.
        let comparable = current.sales > 0 && previous.sales > 0;
        let change = |now: f64, before: f64| {
            if comparable {
                percent_change(now, before)
            } else {
                0.0
            }
        };

        Self {
            period,
            total_revenue: current.revenue,
            total_profit: current.profit,
            total_sales: current.sales,
            average_ticket: current.average_ticket(),
            profit_margin: current.profit_margin(),
            revenue_change: change(current.revenue, previous.revenue),
            sales_change: change(current.sales as f64, previous.sales as f64),
            profit_change: change(current.profit, previous.profit),
        }
    }

    pub fn empty(period: Period) -> Self {
        Self::compare(period, &WindowTotals::new(), &WindowTotals::new())
    }
}

/// (current − previous) / |previous| × 100, or 0 when previous is 0
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) * 100.0 / previous.abs()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub quantity_sold: i64,
    pub revenue: f64,
    pub profit: f64,
}

impl ProductMetrics {
    fn new(product_id: String) -> Self {
        Self {
            product_id,
            product_name: None,
            category: None,
            quantity_sold: 0,
            revenue: 0.0,
            profit: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub revenue: f64,
    pub items_sold: i64,
    /// Percentage of line-item revenue across all categories
    pub revenue_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyMetrics {
    /// Local hour of day, 0–23
    pub hour: u32,
    pub revenue: f64,
    pub sales: usize,
}

/// Aggregate line items per product, highest revenue first.
///
/// Products with equal revenue keep the order in which they were first seen.
pub fn rank_products<'a, I>(sales: I) -> Vec<ProductMetrics>
where
    I: IntoIterator<Item = &'a SaleEvent>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut products: Vec<ProductMetrics> = Vec::new();

    for item in sales.into_iter().flat_map(|sale| sale.items.iter()) {
        let slot = *index.entry(item.product_id.as_str()).or_insert_with(|| {
            products.push(ProductMetrics::new(item.product_id.clone()));
            products.len() - 1
        });

        let product = &mut products[slot];
        product.quantity_sold = product.quantity_sold.saturating_add(item.quantity);
        product.revenue += item.revenue();
        product.profit += item.profit().unwrap_or(0.0);
        if product.product_name.is_none() {
            product.product_name = item.product_name.clone();
        }
        if product.category.is_none() {
            product.category = item.category.clone();
        }
    }

    products.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    products
}

/// Aggregate line items per category, highest revenue first
pub fn category_breakdown<'a, I>(sales: I) -> Vec<CategoryMetrics>
where
    I: IntoIterator<Item = &'a SaleEvent>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut categories: Vec<CategoryMetrics> = Vec::new();

    for item in sales.into_iter().flat_map(|sale| sale.items.iter()) {
        let name = item.category.as_deref().unwrap_or(UNCATEGORIZED);
        let slot = *index.entry(name).or_insert_with(|| {
            categories.push(CategoryMetrics {
                category: name.to_string(),
                revenue: 0.0,
                items_sold: 0,
                revenue_share: 0.0,
            });
            categories.len() - 1
        });

        let category = &mut categories[slot];
        category.revenue += item.revenue();
        category.items_sold = category.items_sold.saturating_add(item.quantity);
    }

    let total: f64 = categories.iter().map(|c| c.revenue).sum();
    if total != 0.0 {
        for category in &mut categories {
            category.revenue_share = category.revenue * 100.0 / total;
        }
    }

    categories.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    categories
}

/// Revenue and sale count per local hour; always 24 slots
pub fn hourly_breakdown<'a, I>(sales: I) -> Vec<HourlyMetrics>
where
    I: IntoIterator<Item = &'a SaleEvent>,
{
    let mut hours: Vec<HourlyMetrics> = (0..24)
        .map(|hour| HourlyMetrics {
            hour,
            revenue: 0.0,
            sales: 0,
        })
        .collect();

    for sale in sales {
        let hour = sale.timestamp.with_timezone(&Local).hour() as usize;
        if let Some(slot) = hours.get_mut(hour) {
            slot.revenue += sale.total;
            slot.sales += 1;
        }
    }

    hours
}
