//! Identifier Lifecycle
//!
//! Each prepared identifier owns a [`LifecycleRecord`] holding two one-shot
//! tokens: one for start and one for stop. A record lives until the identifier
//! is discarded, so preparation is single-use per identifier.

use crate::error::MeasureError;
use fxhash::FxHashMap;

/// Per-identifier lifecycle flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleRecord {
    /// Set by a successful prepare
    pub prepared: bool,
    /// Start token has been used
    pub start_consumed: bool,
    /// Stop token has been used
    pub stop_consumed: bool,
}

impl LifecycleRecord {
    fn fresh() -> Self {
        Self {
            prepared: true,
            start_consumed: false,
            stop_consumed: false,
        }
    }

    /// Whether the start token can still be used
    pub fn can_start(&self) -> bool {
        self.prepared && !self.start_consumed
    }
}

/// Registry of lifecycle records keyed by identifier
#[derive(Debug, Default)]
pub struct LifecycleRegistry {
    records: FxHashMap<String, LifecycleRecord>,
}

impl LifecycleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for an identifier
    pub fn get(&self, identifier: &str) -> Option<&LifecycleRecord> {
        self.records.get(identifier)
    }

    /// Number of identifiers with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no identifier has been prepared
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register a new identifier
    pub fn prepare(&mut self, identifier: &str) -> Result<(), MeasureError> {
        if self.records.contains_key(identifier) {
            return Err(MeasureError::AlreadyPrepared(identifier.to_string()));
        }
        self.records
            .insert(identifier.to_string(), LifecycleRecord::fresh());
        Ok(())
    }

    /// Check that the start token is available without consuming it
    pub fn check_start(&self, identifier: &str) -> Result<(), MeasureError> {
        match self.records.get(identifier) {
            None => Err(MeasureError::NotPrepared(identifier.to_string())),
            Some(record) if !record.can_start() => {
                Err(MeasureError::AlreadyStarted(identifier.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Consume the start token
    pub fn consume_start(&mut self, identifier: &str) -> Result<(), MeasureError> {
        self.check_start(identifier)?;
        if let Some(record) = self.records.get_mut(identifier) {
            record.start_consumed = true;
        }
        Ok(())
    }

    /// Check that the stop token is available without consuming it
    pub fn check_stop(&self, identifier: &str) -> Result<(), MeasureError> {
        match self.records.get(identifier) {
            None => Err(MeasureError::NotPrepared(identifier.to_string())),
            Some(record) if record.stop_consumed => {
                Err(MeasureError::AlreadyStopped(identifier.to_string()))
            }
            Some(record) if !record.start_consumed => {
                Err(MeasureError::NotStarted(identifier.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Consume the stop token
    pub fn consume_stop(&mut self, identifier: &str) -> Result<(), MeasureError> {
        self.check_stop(identifier)?;
        if let Some(record) = self.records.get_mut(identifier) {
            record.stop_consumed = true;
        }
        Ok(())
    }

    /// Forget an identifier entirely (no-op if absent)
    pub fn remove(&mut self, identifier: &str) -> Option<LifecycleRecord> {
        self.records.remove(identifier)
    }
}
