use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use clearcost_core::rates::RatePair;

/// Today's EUR and USD rates, via the same cache the calculator uses.
async fn get_rates(State(state): State<Arc<AppState>>) -> ApiResult<Json<RatePair>> {
    let pair = state.rate_service.rate_pair().await?;
    Ok(Json(pair))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/currency/rates", get(get_rates))
}
