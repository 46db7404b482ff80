use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use clearcost_core::catalog::{Brand, VehicleModel};

/// The local brand dictionary (seeded plus anything materialized since).
async fn list_brands(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Brand>>> {
    let brands = state.catalog_service.brands()?;
    Ok(Json(brands))
}

/// Locally known models only; `/api/market/brands/{id}/models` is the
/// upstream-backed variant.
async fn list_brand_models(
    Path(brand_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<VehicleModel>>> {
    let models = state.catalog_service.models_of_brand(brand_id)?;
    Ok(Json(models))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/brands", get(list_brands))
        .route("/brands/{brand_id}/models", get(list_brand_models))
}
