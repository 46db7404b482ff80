//! History module - per-device calculation records.

mod history_model;
mod history_service;
mod history_traits;

// Re-export the public interface
pub use history_model::{CalculationRecord, NewCalculationRecord};
pub use history_service::HistoryService;
pub use history_traits::{HistoryRepositoryTrait, HistoryServiceTrait};
