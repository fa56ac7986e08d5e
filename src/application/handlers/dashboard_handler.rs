use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::session::{DashboardSession, SharedSession};
use crate::domain::entities::alert::Alert;
use crate::domain::entities::sale::SaleEvent;
use crate::domain::services::metrics::{CategoryMetrics, HourlyMetrics, ProductMetrics, SalesMetrics};
use crate::domain::services::period::Period;

/// Query parameters for the best-sellers endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TopProductsQuery {
    /// Number of products (default from config, clamped to 1..=100)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsQuery {
    pub unacknowledged_only: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportQuery {
    /// `json` (default) or `csv`
    pub format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaleAccepted {
    pub id: String,
    pub sales_recorded: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertActionResponse {
    pub id: String,
    /// False when the action had already been applied
    pub changed: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Build the dashboard API over a shared session
pub fn router(session: SharedSession, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sales", post(record_sale))
        .route("/metrics/:period", get(get_metrics))
        .route("/products/top", get(get_top_products))
        .route("/categories", get(get_category_metrics))
        .route("/hourly", get(get_hourly_metrics))
        .route("/alerts", get(get_alerts).delete(clear_alerts))
        .route("/alerts/:id/acknowledge", post(acknowledge_alert))
        .route("/alerts/:id/dismiss", post(dismiss_alert))
        .route("/export", get(export_data))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

/// Health check endpoint
pub async fn health_check(State(session): State<SharedSession>) -> Json<serde_json::Value> {
    let session = session.lock().await;
    Json(serde_json::json!({
        "status": "running",
        "sales_recorded": session.analytics().len(),
        "session_started_at": session.started_at(),
    }))
}

/// Record a completed sale from the checkout flow
pub async fn record_sale(
    State(session): State<SharedSession>,
    payload: Result<Json<SaleEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleAccepted>), ApiError> {
    let Json(event) = payload.map_err(|rejection| {
        warn!("Unreadable sale payload: {}", rejection.body_text());
        api_error(rejection.status(), rejection.body_text())
    })?;

    if let Err(e) = event.validate() {
        warn!("Rejected sale {}: {}", event.id, e);
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    let id = event.id.clone();
    let mut session = session.lock().await;
    session.add_sale(event);

    Ok((
        StatusCode::CREATED,
        Json(SaleAccepted {
            id,
            sales_recorded: session.analytics().len(),
        }),
    ))
}

pub async fn get_metrics(
    State(session): State<SharedSession>,
    Path(period): Path<String>,
) -> Result<Json<SalesMetrics>, ApiError> {
    let period: Period = period
        .parse()
        .map_err(|e: crate::domain::errors::ValidationError| {
            api_error(StatusCode::NOT_FOUND, e.to_string())
        })?;

    Ok(Json(session.lock().await.metrics(period)))
}

pub async fn get_top_products(
    State(session): State<SharedSession>,
    Query(params): Query<TopProductsQuery>,
) -> Json<Vec<ProductMetrics>> {
    let limit = params.limit.map(|l| l.clamp(1, 100));
    Json(session.lock().await.top_products(limit))
}

pub async fn get_category_metrics(State(session): State<SharedSession>) -> Json<Vec<CategoryMetrics>> {
    Json(session.lock().await.category_metrics())
}

pub async fn get_hourly_metrics(State(session): State<SharedSession>) -> Json<Vec<HourlyMetrics>> {
    Json(session.lock().await.hourly_metrics())
}

pub async fn get_alerts(
    State(session): State<SharedSession>,
    Query(params): Query<AlertsQuery>,
) -> Json<Vec<Alert>> {
    let unacknowledged_only = params.unacknowledged_only.unwrap_or(false);
    Json(session.lock().await.alerts(unacknowledged_only))
}

pub async fn acknowledge_alert(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
) -> Result<Json<AlertActionResponse>, ApiError> {
    let mut session = session.lock().await;
    ensure_current_alert(&session, &id)?;

    let changed = session.acknowledge_alert(&id);
    info!("Alert {} acknowledged", id);
    Ok(Json(AlertActionResponse { id, changed }))
}

pub async fn dismiss_alert(
    State(session): State<SharedSession>,
    Path(id): Path<String>,
) -> Result<Json<AlertActionResponse>, ApiError> {
    let mut session = session.lock().await;
    ensure_current_alert(&session, &id)?;

    let changed = session.dismiss_alert(&id);
    info!("Alert {} dismissed", id);
    Ok(Json(AlertActionResponse { id, changed }))
}

/// Board state is ignored so repeated actions on a dismissed alert still
/// resolve to `changed: false`.
fn ensure_current_alert(session: &DashboardSession, id: &str) -> Result<(), ApiError> {
    if session.analytics().alerts().iter().any(|alert| alert.id == id) {
        Ok(())
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("Unknown alert: {}", id)))
    }
}

pub async fn clear_alerts(State(session): State<SharedSession>) -> StatusCode {
    session.lock().await.clear_alerts();
    StatusCode::NO_CONTENT
}

/// Download the recorded sales as JSON or CSV
pub async fn export_data(
    State(session): State<SharedSession>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let export = session.lock().await.export_data();
    let format = params.format.unwrap_or_else(|| "json".to_string());

    let (content_type, filename, body) = match format.to_lowercase().as_str() {
        "json" => (
            "application/json",
            "sales.json",
            export.to_json(),
        ),
        "csv" => ("text/csv; charset=utf-8", "sales.csv", export.to_csv()),
        other => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Unsupported export format: {}", other),
            ))
        }
    };

    let body = body.map_err(|e| {
        warn!("Export failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::domain::entities::sale::SaleItem;
    use crate::domain::services::clock::{Clock, ManualClock};
    use chrono::{Local, TimeZone, Utc};
    use std::sync::Arc;

    fn shared() -> (SharedSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 6, 17, 12, 0, 0).unwrap(),
        ));
        let session = DashboardSession::new(&AnalyticsConfig::default(), clock.clone());
        (session.into_shared(), clock)
    }

    fn sale(id: &str, clock: &ManualClock) -> SaleEvent {
        SaleEvent::new(id, clock.now().with_timezone(&Utc), 1000.0)
            .with_item(SaleItem::new("p1", 1, 1000.0, Some(600.0)))
    }

    #[tokio::test]
    async fn test_record_sale_accepts_valid_event() {
        let (session, clock) = shared();
        let result = record_sale(State(session.clone()), Ok(Json(sale("s1", &clock)))).await;

        let (status, body) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0.sales_recorded, 1);

        let metrics = get_metrics(State(session), Path("today".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(metrics.profit_margin, 40.0);
    }

    #[tokio::test]
    async fn test_record_sale_rejects_invalid_event() {
        let (session, clock) = shared();
        let mut event = sale("s1", &clock);
        event.items[0].quantity = 0;

        let result = record_sale(State(session.clone()), Ok(Json(event))).await;
        assert_eq!(result.err().unwrap().0, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(session.lock().await.analytics().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_period_is_not_found() {
        let (session, _clock) = shared();
        let result = get_metrics(State(session), Path("decade".to_string())).await;
        assert_eq!(result.err().unwrap().0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_top_products_limit_is_clamped() {
        let (session, clock) = shared();
        record_sale(State(session.clone()), Ok(Json(sale("s1", &clock))))
            .await
            .unwrap();

        let top = get_top_products(State(session), Query(TopProductsQuery { limit: Some(0) })).await;
        assert_eq!(top.0.len(), 1);
    }

    #[tokio::test]
    async fn test_acknowledge_unknown_alert() {
        let (session, _clock) = shared();
        let result = acknowledge_alert(State(session), Path("low_margin:1999-01-01".to_string())).await;
        assert_eq!(result.err().unwrap().0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_acknowledge_then_filter() {
        let (session, _clock) = shared();
        let alerts = get_alerts(
            State(session.clone()),
            Query(AlertsQuery {
                unacknowledged_only: None,
            }),
        )
        .await
        .0;
        assert_eq!(alerts.len(), 1);

        let response = acknowledge_alert(State(session.clone()), Path(alerts[0].id.clone()))
            .await
            .unwrap()
            .0;
        assert!(response.changed);

        let pending = get_alerts(
            State(session.clone()),
            Query(AlertsQuery {
                unacknowledged_only: Some(true),
            }),
        )
        .await
        .0;
        assert!(pending.is_empty());

        assert_eq!(clear_alerts(State(session.clone())).await, StatusCode::NO_CONTENT);
        let pending = get_alerts(
            State(session),
            Query(AlertsQuery {
                unacknowledged_only: Some(true),
            }),
        )
        .await
        .0;
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_twice_reports_unchanged() {
        let (session, _clock) = shared();
        let id = session.lock().await.alerts(false)[0].id.clone();

        let first = dismiss_alert(State(session.clone()), Path(id.clone()))
            .await
            .unwrap()
            .0;
        assert!(first.changed);

        let second = dismiss_alert(State(session.clone()), Path(id.clone()))
            .await
            .unwrap()
            .0;
        assert!(!second.changed);

        let acknowledged = acknowledge_alert(State(session.clone()), Path(id))
            .await
            .unwrap()
            .0;
        assert!(acknowledged.changed);
        assert!(session.lock().await.alerts(false).is_empty());
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_format() {
        let (session, _clock) = shared();
        let result = export_data(
            State(session),
            Query(ExportQuery {
                format: Some("xml".to_string()),
            }),
        )
        .await;
        assert_eq!(result.err().unwrap().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_csv_headers() {
        let (session, clock) = shared();
        record_sale(State(session.clone()), Ok(Json(sale("s1", &clock))))
            .await
            .unwrap();

        let response = export_data(
            State(session),
            Query(ExportQuery {
                format: Some("csv".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
    }
}
