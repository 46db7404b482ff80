use async_trait::async_trait;

use super::history_model::{CalculationRecord, NewCalculationRecord};
use crate::errors::Result;

/// Trait defining the contract for the calculation history store.
#[async_trait]
pub trait HistoryRepositoryTrait: Send + Sync {
    /// A device's records, newest first.
    fn records_for_device(&self, device_id: &str) -> Result<Vec<CalculationRecord>>;

    async fn insert(&self, record: NewCalculationRecord) -> Result<CalculationRecord>;

    /// Deletes one record; false when no row matched.
    async fn delete(&self, record_id: i32) -> Result<bool>;

    /// Deletes everything a device stored; returns the number of rows removed.
    async fn clear_device(&self, device_id: &str) -> Result<usize>;
}

/// Trait defining the contract for history operations exposed to clients.
#[async_trait]
pub trait HistoryServiceTrait: Send + Sync {
    fn history_for_device(&self, device_id: &str) -> Result<Vec<CalculationRecord>>;

    async fn delete_record(&self, record_id: i32) -> Result<bool>;

    async fn clear_device_history(&self, device_id: &str) -> Result<usize>;
}
