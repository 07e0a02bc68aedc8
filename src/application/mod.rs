//! Application layer: the observable calculation history.
//!
//! `HistoryStore` sits between callers and a storage backend. It serializes
//! mutations and republishes the ordered collection to every subscriber
//! through a `tokio::sync::watch` channel.

pub mod history;
