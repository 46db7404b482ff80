use std::sync::Arc;

use async_trait::async_trait;

use super::history_model::CalculationRecord;
use super::history_traits::{HistoryRepositoryTrait, HistoryServiceTrait};
use crate::errors::Result;

/// Per-device calculation history. Thin by design; the interesting write
/// happens inside the calculation flow.
#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn HistoryRepositoryTrait>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn HistoryRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HistoryServiceTrait for HistoryService {
    fn history_for_device(&self, device_id: &str) -> Result<Vec<CalculationRecord>> {
        self.repository.records_for_device(device_id)
    }

    async fn delete_record(&self, record_id: i32) -> Result<bool> {
        let deleted = self.repository.delete(record_id).await?;
        if deleted {
            log::debug!("deleted calculation record {}", record_id);
        }
        Ok(deleted)
    }

    async fn clear_device_history(&self, device_id: &str) -> Result<usize> {
        let removed = self.repository.clear_device(device_id).await?;
        log::debug!("cleared {} calculation records for a device", removed);
        Ok(removed)
    }
}
