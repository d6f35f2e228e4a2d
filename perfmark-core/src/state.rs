//! Measurement State Machine
//!
//! [`MeasurementState`] combines the lifecycle registry, the exclusivity guard
//! and the result histories into one unit that the facade protects with a
//! single lock. Callers resolve the bypass identifier before reaching this
//! type, so every identifier seen here is a regular one.
//!
//! Every operation validates all of its preconditions before mutating
//! anything: a failed call leaves the state exactly as it was.

use crate::error::MeasureError;
use crate::guard::{ExclusivityGuard, GuardState};
use crate::history::{History, HistoryBook};
use crate::lifecycle::{LifecycleRecord, LifecycleRegistry};
use crate::measurement::{Measurement, MeasurementKind};
use std::time::{Duration, Instant};

/// Lifecycle, guard and history for all regular identifiers
#[derive(Debug, Default)]
pub struct MeasurementState {
    lifecycle: LifecycleRegistry,
    guard: ExclusivityGuard,
    history: HistoryBook,
}

impl MeasurementState {
    /// Create an idle state keeping at most `capacity` results per identifier
    pub fn new(capacity: usize) -> Self {
        Self {
            lifecycle: LifecycleRegistry::new(),
            guard: ExclusivityGuard::new(),
            history: HistoryBook::with_capacity(capacity),
        }
    }

    /// Current guard state
    pub fn guard_state(&self) -> &GuardState {
        self.guard.state()
    }

    /// Identifier currently measuring, if any
    pub fn active_identifier(&self) -> Option<&str> {
        self.guard.active_identifier()
    }

    /// Lifecycle record of an identifier
    pub fn lifecycle(&self, identifier: &str) -> Option<&LifecycleRecord> {
        self.lifecycle.get(identifier)
    }

    /// History of an identifier, ignoring the guard
    pub fn raw_history(&self, identifier: &str) -> Option<&History> {
        self.history.get(identifier)
    }

    /// Identifiers with at least one recorded result
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.history.identifiers()
    }

    /// Register an identifier for a single start/stop pair
    pub fn prepare(&mut self, identifier: &str) -> Result<(), MeasureError> {
        self.guard.ensure_idle()?;
        self.lifecycle.prepare(identifier)
    }

    /// Consume the start token and take the guard
    pub fn start(&mut self, identifier: &str, now: Instant) -> Result<(), MeasureError> {
        self.guard.ensure_idle()?;
        self.lifecycle.check_start(identifier)?;

        self.guard.activate(identifier, now)?;
        self.lifecycle.consume_start(identifier)
    }

    /// Consume the stop token, release the guard and record the elapsed time
    pub fn stop(&mut self, identifier: &str, now: Instant) -> Result<Duration, MeasureError> {
        if self.guard.is_idle() {
            self.lifecycle.check_stop(identifier)?;
            return Err(MeasureError::NotStarted(identifier.to_string()));
        }
        let started_at = self.guard.check_release(identifier)?;
        self.lifecycle.check_stop(identifier)?;

        self.guard.release(identifier)?;
        self.lifecycle.consume_stop(identifier)?;

        let duration = now.saturating_duration_since(started_at);
        self.history.record(identifier, Measurement::timed(duration));
        Ok(duration)
    }

    /// Append an externally computed value
    pub fn record_untimed(&mut self, identifier: &str, value: f64) -> Result<(), MeasureError> {
        self.guard.ensure_idle()?;
        self.history.record(identifier, Measurement::untimed(value));
        Ok(())
    }

    /// Most recent result of the given kind
    pub fn newest(
        &self,
        identifier: &str,
        kind: MeasurementKind,
    ) -> Result<Measurement, MeasureError> {
        self.guard.ensure_idle()?;
        self.history
            .newest(identifier, kind)
            .cloned()
            .ok_or_else(|| MeasureError::NoResults(identifier.to_string()))
    }

    /// All values of the given kind, oldest first
    pub fn values(&self, identifier: &str, kind: MeasurementKind) -> Result<Vec<f64>, MeasureError> {
        self.guard.ensure_idle()?;
        let values = self
            .history
            .get(identifier)
            .map(|h| h.values(kind))
            .unwrap_or_default();
        if values.is_empty() {
            return Err(MeasureError::NoResults(identifier.to_string()));
        }
        Ok(values)
    }

    /// Owned copy of an identifier's history
    pub fn history(&self, identifier: &str) -> Result<Vec<Measurement>, MeasureError> {
        self.guard.ensure_idle()?;
        self.history
            .get(identifier)
            .map(History::to_vec)
            .ok_or_else(|| MeasureError::NoResults(identifier.to_string()))
    }

    /// Forget an identifier's lifecycle record and results
    ///
    /// Fails only when `identifier` is the one currently measuring.
    pub fn discard(&mut self, identifier: &str) -> Result<(), MeasureError> {
        if self.guard.active_identifier() == Some(identifier) {
            return Err(MeasureError::Interrupted {
                active: identifier.to_string(),
            });
        }
        self.lifecycle.remove(identifier);
        self.history.clear(identifier);
        Ok(())
    }

    /// Replace an identifier's history with previously persisted entries
    pub fn restore(&mut self, identifier: &str, entries: Vec<Measurement>) {
        self.history.restore(identifier, entries);
    }
}
