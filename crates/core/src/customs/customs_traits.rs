use async_trait::async_trait;

use super::customs_model::{CalculationOutcome, CalculationRequest};
use crate::errors::Result;

/// Trait defining the contract for the customs calculation engine.
#[async_trait]
pub trait CustomsServiceTrait: Send + Sync {
    /// Validates the request, prices the import, persists a history record
    /// for the device, and returns the full breakdown.
    ///
    /// A missing exchange rate aborts the calculation; a missing market
    /// price does not (the breakdown then carries a zero market price).
    async fn calculate(
        &self,
        request: CalculationRequest,
        device_id: &str,
    ) -> Result<CalculationOutcome>;
}
