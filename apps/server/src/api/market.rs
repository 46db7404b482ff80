use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use clearcost_core::customs::FuelType;
use clearcost_market_data::CatalogModel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upstream-backed model list; empty when the upstream cannot answer.
async fn list_models(
    Path(brand_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CatalogModel>>> {
    let models = state.market_price_service.models(brand_id).await?;
    Ok(Json(models))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AveragePriceParams {
    brand_id: i32,
    model_id: i32,
    year: i32,
    fuel_type: Option<FuelType>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AveragePriceResponse {
    /// Interquartile-mean market price; zero when the market had no answer.
    price_usd: Decimal,
}

async fn average_price(
    Query(params): Query<AveragePriceParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AveragePriceResponse>> {
    let price_usd = state
        .market_price_service
        .average_price(params.brand_id, params.model_id, params.year, params.fuel_type)
        .await?;
    Ok(Json(AveragePriceResponse { price_usd }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market/brands/{brand_id}/models", get(list_models))
        .route("/market/average-price", get(average_price))
}
