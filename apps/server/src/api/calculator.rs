use std::sync::Arc;

use crate::{
    api::device_id_header,
    error::ApiResult,
    main_lib::AppState,
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use clearcost_core::customs::{CalculationOutcome, CalculationRequest};
use uuid::Uuid;

/// Runs one landed-cost calculation and records it against the device.
///
/// The device identity is anonymous: the `X-Device-Id` header wins, then the
/// body field, and a client that sent neither gets a fresh UUID (its history
/// starts here).
async fn calculate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CalculationRequest>,
) -> ApiResult<Json<CalculationOutcome>> {
    let device_id = device_id_header(&headers)
        .or_else(|| request.device_id.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let outcome = state.customs_service.calculate(request, &device_id).await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/calculator/calculate", post(calculate))
}
