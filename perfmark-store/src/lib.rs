#![warn(missing_docs)]
//! Perfmark Store - Durable Result History
//!
//! The measurement facade hands each identifier's bounded history to a
//! [`HistoryStore`] whenever it changes, and loads every stored history once at
//! construction. Two stores are provided:
//! - [`JsonFileStore`]: a single JSON document on disk
//! - [`MemoryStore`]: shared in-memory map, for tests and embedding

mod json;
mod memory;

pub use json::{HISTORY_SCHEMA, HISTORY_VERSION, HistoryDocument, JsonFileStore};
pub use memory::MemoryStore;

use perfmark_core::Measurement;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by history stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document belongs to another tool
    #[error("Unexpected schema: {0}")]
    InvalidSchema(String),

    /// Document was written by an incompatible version
    #[error("Unsupported history version: {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}

/// Get/put-by-identifier contract for durable history
pub trait HistoryStore: Send {
    /// Every stored history, keyed by identifier
    fn load_all(&self) -> Result<BTreeMap<String, Vec<Measurement>>, StoreError>;

    /// Stored history of one identifier
    fn load(&self, identifier: &str) -> Result<Option<Vec<Measurement>>, StoreError> {
        Ok(self.load_all()?.remove(identifier))
    }

    /// Replace the stored history of one identifier
    fn save(&mut self, identifier: &str, history: &[Measurement]) -> Result<(), StoreError>;

    /// Delete the stored history of one identifier; returns whether it existed
    fn remove(&mut self, identifier: &str) -> Result<bool, StoreError>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load_all(&self) -> Result<BTreeMap<String, Vec<Measurement>>, StoreError> {
        (**self).load_all()
    }

    fn load(&self, identifier: &str) -> Result<Option<Vec<Measurement>>, StoreError> {
        (**self).load(identifier)
    }

    fn save(&mut self, identifier: &str, history: &[Measurement]) -> Result<(), StoreError> {
        (**self).save(identifier, history)
    }

    fn remove(&mut self, identifier: &str) -> Result<bool, StoreError> {
        (**self).remove(identifier)
    }
}
