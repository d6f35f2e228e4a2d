#![warn(missing_docs)]
//! # Perfmark
//!
//! Instrumentation helper for timing named sections of code from inside a
//! running program or test suite.
//!
//! - **One measurement at a time**: starting a second measurement while one is
//!   in flight fails with an interrupted-measurement error instead of producing
//!   overlapping timings
//! - **One-shot lifecycle**: every identifier is prepared, started and stopped
//!   exactly once until its results are discarded
//! - **Bounded history**: the newest results per identifier are kept, oldest
//!   evicted first, and optionally persisted as JSON between runs
//! - **Outlier-aware aggregates**: samples beyond two standard deviations are
//!   excluded from mean, median and standard deviation once enough results
//!   exist
//!
//! ## Quick Start
//!
//! ```
//! use perfmark::PerformanceHelper;
//!
//! let helper = PerformanceHelper::without_file_storage();
//!
//! helper.prepare_to_measure("ParseManifest").unwrap();
//! helper.start_measuring("ParseManifest").unwrap();
//! // ... code under measurement ...
//! let elapsed = helper.stop_measuring("ParseManifest").unwrap();
//!
//! assert_eq!(helper.newest_timed_measurement("ParseManifest").unwrap(), elapsed);
//! ```
//!
//! ## Untimed Results
//!
//! ```
//! use perfmark::PerformanceHelper;
//!
//! let helper = PerformanceHelper::without_file_storage();
//! helper.record_untimed_measurement("CacheHitRatio", 0.44).unwrap();
//! assert_eq!(helper.newest_untimed_measurement("CacheHitRatio").unwrap(), 0.44);
//! ```
//!
//! Calls made with [`IGNORED_IDENTIFIER`] succeed without touching any state,
//! so instrumentation can be switched off at a call site without removing it.

mod config;
mod helper;

pub use config::{CONFIG_FILE_NAME, ConfigError, HelperConfig};
pub use helper::PerformanceHelper;

pub use perfmark_core::{
    Clock, ErrorKind, IGNORED_IDENTIFIER, ManualClock, MeasureError, Measurement,
    MeasurementKind, MeasurementValue, MonotonicClock,
};
pub use perfmark_stats::{OutlierMethod, OutlierPolicy, SummaryStatistics};
pub use perfmark_store::{HistoryStore, JsonFileStore, MemoryStore, StoreError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        HelperConfig, IGNORED_IDENTIFIER, MeasureError, MeasurementKind, PerformanceHelper,
        SummaryStatistics,
    };
}
