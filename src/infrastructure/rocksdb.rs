use crate::domain::calculation::{CalculationId, CalculationRecord, NewCalculation};
use crate::domain::ports::CalculationStore;
use crate::error::{HistoryError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch, WriteOptions};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Column Family holding one entry per calculation, keyed by big-endian id.
pub const CF_CALCULATIONS: &str = "calculations";
/// Column Family holding bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// A persistent calculation store backed by RocksDB.
///
/// Each mutation is a single `WriteBatch` written with `sync` enabled, so it
/// is on disk before the call returns and never half-applied. The id sequence
/// lives in its own column family and is bumped in the same batch as the
/// insert, so ids are not reused after a delete or a restart.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_id: Arc<Mutex<CalculationId>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "calculations" and "meta" column families exist and
    /// restores the id sequence.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_calculations = ColumnFamilyDescriptor::new(CF_CALCULATIONS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_calculations, cf_meta])?;
        let next_id = read_next_id(&db)?;
        debug!(next_id = next_id.value(), "opened rocksdb calculation store");

        Ok(Self {
            db: Arc::new(db),
            next_id: Arc::new(Mutex::new(next_id)),
        })
    }

    fn calculations_cf(&self) -> Result<&ColumnFamily> {
        column_family(&self.db, CF_CALCULATIONS)
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(true);
        self.db.write_opt(batch, &write_opts)?;
        Ok(())
    }
}

fn column_family<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| HistoryError::Internal(format!("{} column family not found", name)))
}

fn read_next_id(db: &DB) -> Result<CalculationId> {
    let cf = column_family(db, CF_META)?;
    match db.get_cf(cf, NEXT_ID_KEY)? {
        Some(bytes) => {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                HistoryError::Internal("corrupt id sequence in meta column family".to_string())
            })?;
            Ok(CalculationId(u64::from_be_bytes(raw)))
        }
        None => Ok(CalculationId(1)),
    }
}

#[async_trait]
impl CalculationStore for RocksDBStore {
    async fn insert(&self, calculation: NewCalculation, timestamp: i64) -> Result<CalculationRecord> {
        let mut next_id = self.next_id.lock().await;
        let record = CalculationRecord::new(*next_id, calculation, timestamp);
        let following = record.id.next();

        let value = serde_json::to_vec(&record)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(self.calculations_cf()?, record.id.value().to_be_bytes(), value);
        batch.put_cf(
            column_family(&self.db, CF_META)?,
            NEXT_ID_KEY,
            following.value().to_be_bytes(),
        );
        self.write(batch)?;

        *next_id = following;
        Ok(record)
    }

    async fn get_all(&self) -> Result<Vec<CalculationRecord>> {
        let cf = self.calculations_cf()?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }

        Ok(records)
    }

    async fn delete(&self, id: CalculationId) -> Result<bool> {
        // Serialize with inserts so the existence check and the delete agree.
        let _guard = self.next_id.lock().await;
        let cf = self.calculations_cf()?;
        let key = id.value().to_be_bytes();

        if self.db.get_pinned_cf(cf, key)?.is_none() {
            return Ok(false);
        }

        let mut batch = WriteBatch::default();
        batch.delete_cf(cf, key);
        self.write(batch)?;
        Ok(true)
    }

    async fn delete_all(&self) -> Result<usize> {
        let _guard = self.next_id.lock().await;
        let cf = self.calculations_cf()?;

        let mut batch = WriteBatch::default();
        let mut removed = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            batch.delete_cf(cf, key);
            removed += 1;
        }

        if removed > 0 {
            self.write(batch)?;
        }
        Ok(removed)
    }
}
