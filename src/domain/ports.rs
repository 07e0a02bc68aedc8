use super::calculation::{CalculationId, CalculationRecord, NewCalculation};
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage for calculation records.
///
/// Implementations assign ids and must either fully apply a mutation or leave
/// the stored data untouched.
#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Persists a new record, assigning it the next id.
    async fn insert(&self, calculation: NewCalculation, timestamp: i64) -> Result<CalculationRecord>;
    /// Returns all records in no particular order.
    async fn get_all(&self) -> Result<Vec<CalculationRecord>>;
    /// Removes a record. Returns whether it existed.
    async fn delete(&self, id: CalculationId) -> Result<bool>;
    /// Removes every record. Returns how many were removed.
    async fn delete_all(&self) -> Result<usize>;
}

pub type CalculationStoreBox = Box<dyn CalculationStore>;

/// Source of record timestamps, in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock. Not monotonic across clock adjustments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
