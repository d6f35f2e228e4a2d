#![warn(missing_docs)]
//! Perfmark Core - Measurement Lifecycle
//!
//! This crate holds the state machine behind every measurement:
//! - Identifier validation and the bypass identifier
//! - One-shot start/stop tokens per prepared identifier
//! - The exclusivity guard allowing one real measurement at a time
//! - Bounded per-identifier result history
//! - A monotonic [`Clock`] abstraction
//!
//! Nothing here locks; `perfmark` wraps [`MeasurementState`] in a mutex.

mod clock;
mod error;
mod guard;
mod history;
mod identifier;
mod lifecycle;
mod measurement;
mod state;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{ErrorKind, MeasureError};
pub use guard::{ExclusivityGuard, GuardState};
pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistoryBook};
pub use identifier::{IGNORED_IDENTIFIER, Identifier};
pub use lifecycle::{LifecycleRecord, LifecycleRegistry};
pub use measurement::{Measurement, MeasurementKind, MeasurementValue};
pub use state::MeasurementState;
