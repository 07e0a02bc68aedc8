//! Domain types and ports.
//!
//! Everything in here is storage-agnostic: the tip arithmetic, the record
//! shape persisted by every backend, and the traits backends implement.

pub mod calculation;
pub mod ports;
pub mod tip;
