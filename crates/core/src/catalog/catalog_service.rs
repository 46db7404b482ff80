use std::sync::Arc;

use async_trait::async_trait;

use super::catalog_model::{Brand, VehicleModel};
use super::catalog_traits::{CatalogRepositoryTrait, CatalogServiceTrait};
use crate::errors::Result;
use crate::market_prices::MarketPriceServiceTrait;

/// Brand/model dictionary over the local store, with lazy materialization
/// of models first seen in a calculation.
pub struct CatalogService {
    repository: Arc<dyn CatalogRepositoryTrait>,
    market_prices: Arc<dyn MarketPriceServiceTrait>,
}

impl CatalogService {
    pub fn new(
        repository: Arc<dyn CatalogRepositoryTrait>,
        market_prices: Arc<dyn MarketPriceServiceTrait>,
    ) -> Self {
        Self {
            repository,
            market_prices,
        }
    }

    /// Materialize a model the local dictionary has not seen yet, taking
    /// its display name from the upstream catalog. Returns `None` when the
    /// upstream does not list the id either.
    async fn materialize_model(&self, brand_id: i32, model_id: i32) -> Result<Option<i32>> {
        let listed = self.market_prices.models(brand_id).await?;

        match listed.into_iter().find(|model| model.id == model_id) {
            Some(found) => {
                let inserted = self
                    .repository
                    .insert_model(VehicleModel {
                        id: found.id,
                        name: found.name,
                        brand_id,
                    })
                    .await?;
                log::debug!(
                    "materialized model {} '{}' under brand {}",
                    inserted.id,
                    inserted.name,
                    brand_id
                );
                Ok(Some(inserted.id))
            }
            None => {
                log::debug!(
                    "model {} not listed for brand {}; keeping record unreferenced",
                    model_id,
                    brand_id
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    fn brands(&self) -> Result<Vec<Brand>> {
        self.repository.brands()
    }

    fn models_of_brand(&self, brand_id: i32) -> Result<Vec<VehicleModel>> {
        self.repository.models_of_brand(brand_id)
    }

    async fn resolve_references(
        &self,
        brand_id: i32,
        model_id: i32,
    ) -> Result<(Option<i32>, Option<i32>)> {
        let brand = if brand_id > 0 && self.repository.brand_exists(brand_id)? {
            Some(brand_id)
        } else {
            None
        };

        let model = match brand {
            Some(brand_id) if model_id > 0 => {
                if self.repository.model_exists(model_id)? {
                    Some(model_id)
                } else {
                    self.materialize_model(brand_id, model_id).await?
                }
            }
            _ => None,
        };

        Ok((brand, model))
    }
}
