use crate::domain::calculation::{CalculationId, CalculationRecord, NewCalculation};
use crate::domain::ports::CalculationStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: CalculationId,
    rows: BTreeMap<CalculationId, CalculationRecord>,
}

/// A thread-safe in-memory calculation store.
///
/// Nothing survives the process. Useful for tests and throwaway sessions.
#[derive(Default, Clone)]
pub struct InMemoryCalculationStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryCalculationStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalculationStore for InMemoryCalculationStore {
    async fn insert(&self, calculation: NewCalculation, timestamp: i64) -> Result<CalculationRecord> {
        let mut table = self.table.write().await;
        let id = table.last_id.next();
        let record = CalculationRecord::new(id, calculation, timestamp);
        table.rows.insert(id, record.clone());
        table.last_id = id;
        Ok(record)
    }

    async fn get_all(&self) -> Result<Vec<CalculationRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn delete(&self, id: CalculationId) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut table = self.table.write().await;
        let removed = table.rows.len();
        table.rows.clear();
        Ok(removed)
    }
}
