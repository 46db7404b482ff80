use std::sync::Arc;

use crate::{
    api::device_id_header,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use clearcost_core::history::CalculationRecord;

fn require_device_id(headers: &HeaderMap) -> Result<String, ApiError> {
    device_id_header(headers)
        .ok_or_else(|| ApiError::BadRequest("X-Device-Id header is required".to_string()))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<CalculationRecord>>> {
    let device_id = require_device_id(&headers)?;
    let records = state.history_service.history_for_device(&device_id)?;
    Ok(Json(records))
}

async fn delete_record(
    Path(record_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    if state.history_service.delete_record(record_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn clear_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let device_id = require_device_id(&headers)?;
    state.history_service.clear_device_history(&device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history", get(get_history))
        // Static segment before the capture so "clear" is never parsed as an id.
        .route("/history/clear", delete(clear_history))
        .route("/history/{record_id}", delete(delete_record))
}
