use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Alert kinds derived from sales activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowSales,
    LowMargin,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowSales => "low_sales",
            AlertKind::LowMargin => "low_margin",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// A warning derived from the current sales state.
///
/// Alerts are recomputed on every query. The id is built from the kind and the
/// day the alert refers to, so the same condition on the same day always
/// yields the same id and caller-side acknowledgements stick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub date: NaiveDate,
    pub acknowledged: bool,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        date: NaiveDate,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Self::id_for(kind, date),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            metadata: None,
            date,
            acknowledged: false,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn id_for(kind: AlertKind, date: NaiveDate) -> String {
        format!("{}:{}", kind, date.format("%Y-%m-%d"))
    }
}
