//! SQLite storage implementation for exchange rates.

mod model;
mod repository;

pub use model::{CurrencyRateDB, NewCurrencyRateDB};
pub use repository::RateRepository;
