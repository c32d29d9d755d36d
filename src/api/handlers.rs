use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use super::dto::*;
use super::error::ApiError;
use super::state::AppState;
use crate::storage::TransactionManager;

/// POST /calculate-installments - quote an amount over every tenor
pub async fn calculate_installments<M: TransactionManager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    req: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = req?;
    let quotes = state.financing.calculate_all_tenors(req.amount)?;

    Ok(Json(CalculateResponse {
        calculations: quotes.into_iter().map(CalculationResult::from).collect(),
    }))
}

/// POST /submit-financing - grant a facility and return its schedule
pub async fn submit_financing<M: TransactionManager + 'static>(
    State(state): State<Arc<AppState<M>>>,
    req: Result<Json<SubmitFinancingRequest>, JsonRejection>,
) -> Result<Json<SubmitFinancingResponse>, ApiError> {
    let Json(req) = req?;
    let start_date = req.start_date.clone();
    let receipt = state.financing.submit_financing(&req.into())?;

    Ok(Json(SubmitFinancingResponse::from_receipt(receipt, start_date)))
}

/// GET /health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
