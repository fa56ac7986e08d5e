use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::domain::entities::sale::{SaleEvent, SaleItem};
use crate::domain::errors::AnalyticsError;
use crate::domain::services::metrics::SalesMetrics;

const CSV_HEADER: [&str; 11] = [
    "sale_id",
    "timestamp",
    "payment_method",
    "cashier_id",
    "sale_total",
    "product_id",
    "product_name",
    "category",
    "quantity",
    "unit_price",
    "unit_cost",
];

/// Snapshot handed to the dashboard's download action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub sales: Vec<SaleEvent>,
    /// Today's metrics at export time
    pub metrics: SalesMetrics,
    pub exported_at: DateTime<Utc>,
}

impl ExportData {
    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One row per line item. A sale without items still gets one row, with
    /// the item columns left empty.
    pub fn to_csv(&self) -> Result<String, AnalyticsError> {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;

        for sale in &self.sales {
            if sale.items.is_empty() {
                wtr.write_record(sale_row(sale, None))?;
            }
            for item in &sale.items {
                wtr.write_record(sale_row(sale, Some(item)))?;
            }
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| AnalyticsError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AnalyticsError::Export(e.to_string()))
    }
}

fn sale_row(sale: &SaleEvent, item: Option<&SaleItem>) -> Vec<String> {
    let mut row = vec![
        sale.id.clone(),
        sale.timestamp.to_rfc3339(),
        sale.payment_method.clone().unwrap_or_default(),
        sale.cashier_id.clone().unwrap_or_default(),
        sale.total.to_string(),
    ];

    match item {
        Some(item) => row.extend([
            item.product_id.clone(),
            item.product_name.clone().unwrap_or_default(),
            item.category.clone().unwrap_or_default(),
            item.quantity.to_string(),
            item.price.to_string(),
            item.cost.map(|c| c.to_string()).unwrap_or_default(),
        ]),
        None => row.extend(std::iter::repeat(String::new()).take(6)),
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::period::Period;
    use chrono::TimeZone;

    fn export() -> ExportData {
        let ts = Utc.with_ymd_and_hms(2026, 6, 17, 9, 30, 0).unwrap();
        ExportData {
            sales: vec![
                SaleEvent::new("s1", ts, 1200.0)
                    .paid_with("card")
                    .rung_up_by("cashier-7")
                    .with_item(
                        SaleItem::new("p1", 2, 500.0, Some(300.0))
                            .named("Screen protector, tempered")
                            .in_category("accessories"),
                    )
                    .with_item(SaleItem::new("p2", 1, 200.0, None)),
                SaleEvent::new("s2", ts, 80.0),
            ],
            metrics: SalesMetrics::empty(Period::Today),
            exported_at: ts,
        }
    }

    #[test]
    fn test_csv_has_one_row_per_item() {
        let csv = export().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("sale_id,timestamp,payment_method"));
        assert_eq!(
            lines[1],
            "s1,2026-06-17T09:30:00+00:00,card,cashier-7,1200,p1,\"Screen protector, tempered\",accessories,2,500,300"
        );
        assert_eq!(lines[2], "s1,2026-06-17T09:30:00+00:00,card,cashier-7,1200,p2,,,1,200,");
        assert_eq!(lines[3], "s2,2026-06-17T09:30:00+00:00,,,80,,,,,,");
    }

    #[test]
    fn test_json_export_round_trips() {
        let data = export();
        let json = data.to_json().unwrap();
        let parsed: ExportData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }
}
