//! SQLite storage implementation for calculation history.

mod model;
mod repository;

pub use model::{CalculationRecordDB, NewCalculationRecordDB};
pub use repository::HistoryRepository;
