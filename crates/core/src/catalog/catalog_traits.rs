use async_trait::async_trait;

use super::catalog_model::{Brand, VehicleModel};
use crate::errors::Result;

/// Trait defining the contract for the brand/model dictionary store.
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    /// All brands, ordered by name.
    fn brands(&self) -> Result<Vec<Brand>>;

    fn brand_exists(&self, brand_id: i32) -> Result<bool>;

    /// Locally known models of a brand, ordered by name.
    fn models_of_brand(&self, brand_id: i32) -> Result<Vec<VehicleModel>>;

    fn model_exists(&self, model_id: i32) -> Result<bool>;

    /// Inserts a model row; inserting an id that already exists is a no-op.
    async fn insert_model(&self, model: VehicleModel) -> Result<VehicleModel>;
}

/// Trait defining the contract for dictionary lookups and reference
/// resolution.
#[async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    fn brands(&self) -> Result<Vec<Brand>>;

    fn models_of_brand(&self, brand_id: i32) -> Result<Vec<VehicleModel>>;

    /// Decides which foreign keys a calculation record may carry.
    ///
    /// The brand reference is kept only when the brand is locally known.
    /// A model unknown locally under a known brand is looked up in the
    /// upstream catalog and materialized on a match; otherwise the record
    /// is stored without the reference.
    async fn resolve_references(
        &self,
        brand_id: i32,
        model_id: i32,
    ) -> Result<(Option<i32>, Option<i32>)>;
}
