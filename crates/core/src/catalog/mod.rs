//! Catalog module - the local brand/model dictionary.

mod catalog_model;
mod catalog_service;
mod catalog_traits;

// Re-export the public interface
pub use catalog_model::{Brand, VehicleModel};
pub use catalog_service::CatalogService;
pub use catalog_traits::{CatalogRepositoryTrait, CatalogServiceTrait};
