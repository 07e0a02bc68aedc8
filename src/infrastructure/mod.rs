//! Storage adapters implementing [`crate::domain::ports::CalculationStore`].

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
