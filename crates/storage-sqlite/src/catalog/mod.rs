//! SQLite storage implementation for the brand/model dictionary.

mod model;
mod repository;

pub use model::{CarBrandDB, CarModelDB};
pub use repository::CatalogRepository;
