//! HTTP surface over the financing service.

mod dto;
mod error;
mod handlers;
mod state;

pub use dto::{
    CalculateRequest, CalculateResponse, CalculationResult, ScheduleItem, SubmitFinancingRequest,
    SubmitFinancingResponse,
};
pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::storage::TransactionManager;

/// Build the application router
pub fn router<M: TransactionManager + 'static>(state: Arc<AppState<M>>) -> Router {
    Router::new()
        .route("/calculate-installments", post(handlers::calculate_installments::<M>))
        .route("/submit-financing", post(handlers::submit_financing::<M>))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinancingConfig;
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn store() -> MemoryStore {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()));
        MemoryStore::seeded(time).unwrap()
    }

    fn app(store: &MemoryStore) -> Router {
        router(AppState::from_store(store.clone(), FinancingConfig::default()))
    }

    async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn submission(amount: i64) -> String {
        json!({
            "user_id": 3,
            "facility_limit_id": 3,
            "amount": amount,
            "tenor": 12,
            "start_date": "2025-08-10"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&store())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_calculate_installments() {
        let (status, body) = post_json(
            app(&store()),
            "/calculate-installments",
            json!({"amount": 12000000}).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = body["calculations"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["tenor"], 6);
        assert_eq!(rows[5]["tenor"], 36);
        assert!((rows[1]["monthly_installment"].as_f64().unwrap() - 1_200_000.0).abs() < 0.01);
        assert!((rows[1]["total_payment"].as_f64().unwrap() - 14_400_000.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_calculate_rejects_zero_amount() {
        let (status, body) = post_json(
            app(&store()),
            "/calculate-installments",
            json!({"amount": 0}).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "amount must be greater than 0");
    }

    #[tokio::test]
    async fn test_calculate_overflowing_amount_is_bad_request() {
        let (status, body) = post_json(
            app(&store()),
            "/calculate-installments",
            r#"{"amount": 5e28}"#.to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("calculation error"));
    }

    #[tokio::test]
    async fn test_calculate_with_empty_catalog() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()));
        let (status, body) = post_json(
            app(&MemoryStore::new(time)),
            "/calculate-installments",
            json!({"amount": 1000}).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no tenor available");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = post_json(app(&store()), "/calculate-installments", "{\"amount\":".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = post_json(
            app(&store()),
            "/submit-financing",
            json!({"user_id": "three"}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_financing() {
        let store = store();
        let (status, body) = post_json(app(&store), "/submit-financing", submission(12_000_000)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 3);
        assert_eq!(body["facility_limit_id"], 3);
        assert_eq!(body["tenor"], 12);
        assert_eq!(body["start_date"], "2025-08-10");
        assert!((body["monthly_installment"].as_f64().unwrap() - 1_200_000.0).abs() < 0.01);
        assert!((body["total_margin"].as_f64().unwrap() - 2_400_000.0).abs() < 0.01);

        let schedule = body["schedule"].as_array().unwrap();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[0]["due_date"], "2025-09-10");
        assert_eq!(schedule[11]["due_date"], "2026-08-10");

        assert_eq!(store.facilities().unwrap().len(), 1);
        assert_eq!(store.facility_detail_count().unwrap(), 12);
    }

    #[tokio::test]
    async fn test_submit_over_ceiling_is_bad_request() {
        let store = store();
        let (status, body) = post_json(app(&store), "/submit-financing", submission(20_000_000)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "insufficient facility limit");
        assert!(store.facilities().unwrap().is_empty());
    }
}
