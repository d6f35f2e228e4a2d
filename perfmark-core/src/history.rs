//! Result History
//!
//! Bounded, ordered record of measurements per identifier. Entries are kept
//! newest-last and the oldest entry is evicted once the capacity is exceeded.
//! Raw samples are always preserved here; outlier exclusion happens in the
//! aggregates computed on top (see `perfmark-stats`).

use crate::measurement::{Measurement, MeasurementKind};
use fxhash::FxHashMap;
use std::collections::VecDeque;

/// Default number of results kept per identifier
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// History of a single identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: VecDeque<Measurement>,
}

impl History {
    /// Build from existing entries, keeping the newest `capacity` of them
    pub fn from_entries(entries: impl IntoIterator<Item = Measurement>, capacity: usize) -> Self {
        let mut history = Self::default();
        for entry in entries {
            history.push(entry, capacity);
        }
        history
    }

    /// Append an entry, evicting the oldest beyond `capacity`
    pub fn push(&mut self, entry: Measurement, capacity: usize) {
        self.entries.push_back(entry);
        while self.entries.len() > capacity.max(1) {
            self.entries.pop_front();
        }
    }

    /// Most recent entry of the given kind
    pub fn newest(&self, kind: MeasurementKind) -> Option<&Measurement> {
        self.entries.iter().rev().find(|m| m.kind() == kind)
    }

    /// Values of the given kind, oldest first
    pub fn values(&self, kind: MeasurementKind) -> Vec<f64> {
        self.entries
            .iter()
            .filter(|m| m.kind() == kind)
            .map(Measurement::as_f64)
            .collect()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: MeasurementKind) -> usize {
        self.entries.iter().filter(|m| m.kind() == kind).count()
    }

    /// Iterate entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.entries.iter()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of the entries, oldest first
    pub fn to_vec(&self) -> Vec<Measurement> {
        self.entries.iter().cloned().collect()
    }
}

/// Histories for all identifiers, sharing one capacity
#[derive(Debug)]
pub struct HistoryBook {
    capacity: usize,
    histories: FxHashMap<String, History>,
}

impl Default for HistoryBook {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBook {
    /// Create an empty book; capacity is clamped to at least 1
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            histories: FxHashMap::default(),
        }
    }

    /// Per-identifier capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a measurement to an identifier's history
    pub fn record(&mut self, identifier: &str, entry: Measurement) -> &History {
        let capacity = self.capacity;
        let history = self.histories.entry(identifier.to_string()).or_default();
        history.push(entry, capacity);
        history
    }

    /// Replace an identifier's history with loaded entries
    pub fn restore(&mut self, identifier: &str, entries: Vec<Measurement>) {
        let history = History::from_entries(entries, self.capacity);
        if history.is_empty() {
            self.histories.remove(identifier);
        } else {
            self.histories.insert(identifier.to_string(), history);
        }
    }

    /// History of an identifier
    pub fn get(&self, identifier: &str) -> Option<&History> {
        self.histories.get(identifier)
    }

    /// Most recent entry of the given kind for an identifier
    pub fn newest(&self, identifier: &str, kind: MeasurementKind) -> Option<&Measurement> {
        self.histories.get(identifier)?.newest(kind)
    }

    /// Drop an identifier's history
    pub fn clear(&mut self, identifier: &str) -> bool {
        self.histories.remove(identifier).is_some()
    }

    /// Identifiers with at least one entry
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.histories.keys().map(String::as_str)
    }
}
