//! Measurement Facade
//!
//! [`PerformanceHelper`] is the public surface: it validates identifiers,
//! short-circuits the bypass identifier, drives the core state machine under
//! the measurement-state lock and forwards changed histories to the durable
//! store under a separate persistence lock.
//!
//! Lock order is persistence -> state. The state lock is only held for
//! in-memory transitions, never while a measured body runs or while the
//! store performs I/O.

use crate::config::HelperConfig;
use perfmark_core::{
    Clock, History, IGNORED_IDENTIFIER, Identifier, MeasureError, Measurement, MeasurementKind,
    MeasurementState, MonotonicClock,
};
use perfmark_stats::{SummaryStatistics, summarize_with_policy};
use perfmark_store::{HistoryStore, JsonFileStore, StoreError};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Instrumentation helper allowing one real measurement at a time
///
/// Construct one instance per process and share it by reference.
///
/// ```
/// use perfmark::PerformanceHelper;
///
/// let helper = PerformanceHelper::without_file_storage();
/// helper.prepare_to_measure("Migrate250Records").unwrap();
/// let rows = helper
///     .measure_scoped("Migrate250Records", || (0..250).sum::<u32>())
///     .unwrap();
/// assert_eq!(rows, 31125);
/// assert!(helper.newest_timed_measurement("Migrate250Records").is_ok());
/// ```
pub struct PerformanceHelper {
    config: HelperConfig,
    clock: Box<dyn Clock>,
    state: Mutex<MeasurementState>,
    store: Option<Mutex<Box<dyn HistoryStore>>>,
}

impl PerformanceHelper {
    /// Create a helper, opening the JSON store at `config.storage_path` when
    /// file storage is enabled and loading any history found there
    pub fn new(config: HelperConfig) -> Result<Self, StoreError> {
        if config.use_file_storage {
            let store = JsonFileStore::new(&config.storage_path);
            Self::with_store(config, store)
        } else {
            Ok(Self::build(config, None))
        }
    }

    /// Helper with default behaviour that never touches the filesystem
    pub fn without_file_storage() -> Self {
        Self::build(HelperConfig::for_unit_tests(), None)
    }

    /// Create a helper persisting through `store`
    ///
    /// The store is only consulted when `config.use_file_storage` is set.
    pub fn with_store(
        config: HelperConfig,
        store: impl HistoryStore + 'static,
    ) -> Result<Self, StoreError> {
        if !config.use_file_storage {
            return Ok(Self::build(config, None));
        }

        let loaded = store.load_all()?;
        let helper = Self::build(config, Some(Box::new(store)));
        {
            let mut state = helper.lock_state();
            for (identifier, entries) in loaded {
                if identifier.is_empty() || identifier == IGNORED_IDENTIFIER {
                    continue;
                }
                state.restore(&identifier, entries);
            }
            tracing::debug!(
                target: "perfmark",
                identifiers = state.identifiers().count(),
                "loaded persisted history"
            );
        }
        Ok(helper)
    }

    fn build(config: HelperConfig, store: Option<Box<dyn HistoryStore>>) -> Self {
        let state = MeasurementState::new(config.history_capacity());
        Self {
            config,
            clock: Box::new(MonotonicClock),
            state: Mutex::new(state),
            store: store.map(Mutex::new),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Identifier currently holding the exclusivity guard
    pub fn active_identifier(&self) -> Option<String> {
        self.lock_state().active_identifier().map(str::to_string)
    }

    /// Register an identifier for one start/stop pair
    pub fn prepare_to_measure(&self, identifier: &str) -> Result<(), MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            tracing::trace!(target: "perfmark", "prepare bypassed");
            return Ok(());
        };

        self.lock_state().prepare(name)?;
        tracing::debug!(target: "perfmark", identifier = name, "prepared");
        Ok(())
    }

    /// Begin timing a prepared identifier
    pub fn start_measuring(&self, identifier: &str) -> Result<(), MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            tracing::trace!(target: "perfmark", "start bypassed");
            return Ok(());
        };

        {
            let mut state = self.lock_state();
            let now = self.clock.now();
            state.start(name, now)?;
        }
        tracing::debug!(target: "perfmark", identifier = name, "measurement started");
        Ok(())
    }

    /// Finish timing the active identifier and record the elapsed time
    pub fn stop_measuring(&self, identifier: &str) -> Result<Duration, MeasureError> {
        let now = self.clock.now();
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            tracing::trace!(target: "perfmark", "stop bypassed");
            return Ok(Duration::ZERO);
        };

        let duration = self.lock_state().stop(name, now)?;

        if self.config.print_measurement_log {
            tracing::info!(
                target: "perfmark",
                identifier = name,
                seconds = duration.as_secs_f64(),
                "{name}: {:.6}s",
                duration.as_secs_f64()
            );
        } else {
            tracing::debug!(target: "perfmark", identifier = name, ?duration, "measurement stopped");
        }

        self.sync_store(name);
        Ok(duration)
    }

    /// Time `body` under a prepared identifier
    ///
    /// The stop always runs, even if `body` panics, so the guard is never left
    /// active by a failing body. The state lock is not held while `body` runs.
    pub fn measure_scoped<R>(
        &self,
        identifier: &str,
        body: impl FnOnce() -> R,
    ) -> Result<R, MeasureError> {
        if Identifier::parse(identifier)?.is_ignored() {
            return Ok(body());
        }

        self.start_measuring(identifier)?;
        let scope = ActiveScope {
            helper: self,
            identifier,
            armed: true,
        };
        let output = body();
        scope.finish()?;
        Ok(output)
    }

    /// Like [`measure_scoped`](Self::measure_scoped), preparing the identifier
    /// first if it has never been prepared
    pub fn measure<R>(&self, identifier: &str, body: impl FnOnce() -> R) -> Result<R, MeasureError> {
        match self.prepare_to_measure(identifier) {
            Ok(()) | Err(MeasureError::AlreadyPrepared(_)) => {}
            Err(e) => return Err(e),
        }
        self.measure_scoped(identifier, body)
    }

    /// Record an externally computed value; no preparation required
    pub fn record_untimed_measurement(&self, identifier: &str, value: f64) -> Result<(), MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            tracing::trace!(target: "perfmark", "untimed record bypassed");
            return Ok(());
        };

        self.lock_state().record_untimed(name, value)?;
        if self.config.print_measurement_log {
            tracing::info!(target: "perfmark", identifier = name, value, "{name}: {value}");
        }

        self.sync_store(name);
        Ok(())
    }

    /// Forget an identifier's lifecycle and results so it can be prepared again
    pub fn discard_previous_results(&self, identifier: &str) -> Result<(), MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            tracing::trace!(target: "perfmark", "discard bypassed");
            return Ok(());
        };

        self.lock_state().discard(name)?;
        tracing::debug!(target: "perfmark", identifier = name, "results discarded");

        self.sync_store(name);
        Ok(())
    }

    /// Most recent timed result (raw, never outlier-filtered)
    pub fn newest_timed_measurement(&self, identifier: &str) -> Result<Duration, MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            return Ok(Duration::ZERO);
        };

        let newest = self.lock_state().newest(name, MeasurementKind::Timed)?;
        Ok(newest.duration().unwrap_or_default())
    }

    /// Most recent untimed result (raw, never outlier-filtered)
    pub fn newest_untimed_measurement(&self, identifier: &str) -> Result<f64, MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            return Ok(0.0);
        };

        let newest = self.lock_state().newest(name, MeasurementKind::Untimed)?;
        Ok(newest.untimed_value().unwrap_or_default())
    }

    /// Aggregate statistics over one kind of result, applying the outlier policy
    pub fn summary(
        &self,
        identifier: &str,
        kind: MeasurementKind,
    ) -> Result<SummaryStatistics, MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            return Ok(SummaryStatistics::empty());
        };

        let values = self.lock_state().values(name, kind)?;
        Ok(summarize_with_policy(&values, &self.config.outlier_policy()))
    }

    /// Aggregate statistics over timed results, in seconds
    pub fn timed_summary(&self, identifier: &str) -> Result<SummaryStatistics, MeasureError> {
        self.summary(identifier, MeasurementKind::Timed)
    }

    /// Aggregate statistics over untimed results
    pub fn untimed_summary(&self, identifier: &str) -> Result<SummaryStatistics, MeasureError> {
        self.summary(identifier, MeasurementKind::Untimed)
    }

    /// Raw bounded history, oldest first
    pub fn history(&self, identifier: &str) -> Result<Vec<Measurement>, MeasureError> {
        let Identifier::Named(name) = Identifier::parse(identifier)? else {
            return Ok(Vec::new());
        };

        self.lock_state().history(name)
    }

    fn lock_state(&self) -> MutexGuard<'_, MeasurementState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the current history of `identifier` to the store, if any.
    ///
    /// The snapshot is taken while holding the persistence lock so that
    /// concurrent writers for the same identifier land in order.
    fn sync_store(&self, identifier: &str) {
        let Some(store) = &self.store else {
            return;
        };
        let mut store = store.lock().unwrap_or_else(|e| e.into_inner());

        let snapshot = self
            .lock_state()
            .raw_history(identifier)
            .map(History::to_vec)
            .unwrap_or_default();

        let result = if snapshot.is_empty() {
            store.remove(identifier).map(|_| ())
        } else {
            store.save(identifier, &snapshot)
        };
        if let Err(e) = result {
            tracing::warn!(
                target: "perfmark",
                identifier,
                error = %e,
                "failed to persist history"
            );
        }
    }
}

impl std::fmt::Debug for PerformanceHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceHelper")
            .field("config", &self.config)
            .field("active_identifier", &self.active_identifier())
            .field("file_storage", &self.store.is_some())
            .finish()
    }
}

/// Stops the active measurement when dropped unless finished explicitly
struct ActiveScope<'a> {
    helper: &'a PerformanceHelper,
    identifier: &'a str,
    armed: bool,
}

impl ActiveScope<'_> {
    fn finish(mut self) -> Result<Duration, MeasureError> {
        self.armed = false;
        self.helper.stop_measuring(self.identifier)
    }
}

impl Drop for ActiveScope<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.helper.stop_measuring(self.identifier) {
            tracing::warn!(
                target: "perfmark",
                identifier = self.identifier,
                error = %e,
                "failed to stop measurement while unwinding"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfmark_core::{ErrorKind, ManualClock};
    use std::sync::Arc;

    fn helper_with_clock() -> (PerformanceHelper, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let helper = PerformanceHelper::without_file_storage().with_clock(clock.clone());
        (helper, clock)
    }

    #[test]
    fn test_stop_returns_clock_elapsed() {
        let (helper, clock) = helper_with_clock();
        helper.prepare_to_measure("a").unwrap();
        helper.start_measuring("a").unwrap();
        clock.advance(Duration::from_millis(1250));

        assert_eq!(helper.stop_measuring("a").unwrap(), Duration::from_millis(1250));
        assert_eq!(
            helper.newest_timed_measurement("a").unwrap(),
            Duration::from_millis(1250)
        );
    }

    #[test]
    fn test_empty_identifier_everywhere() {
        let helper = PerformanceHelper::without_file_storage();
        let err = MeasureError::EmptyIdentifier;
        assert_eq!(helper.prepare_to_measure(""), Err(err.clone()));
        assert_eq!(helper.start_measuring(""), Err(err.clone()));
        assert_eq!(helper.stop_measuring(""), Err(err.clone()));
        assert_eq!(helper.discard_previous_results(""), Err(err.clone()));
        assert_eq!(helper.record_untimed_measurement("", 0.2), Err(err.clone()));
        assert_eq!(helper.newest_timed_measurement(""), Err(err.clone()));
        assert_eq!(helper.newest_untimed_measurement(""), Err(err.clone()));

        let mut ran = false;
        assert_eq!(helper.measure_scoped("", || ran = true), Err(err));
        assert!(!ran);
    }

    #[test]
    fn test_scoped_stop_runs_on_panic() {
        let (helper, clock) = helper_with_clock();
        helper.prepare_to_measure("boom").unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = helper.measure_scoped("boom", || {
                clock.advance(Duration::from_millis(3));
                panic!("measured body failed");
            });
        }));
        assert!(result.is_err());

        assert_eq!(helper.active_identifier(), None);
        assert_eq!(
            helper.newest_timed_measurement("boom").unwrap(),
            Duration::from_millis(3)
        );
        helper.prepare_to_measure("next").unwrap();
    }

    #[test]
    fn test_scoped_requires_prepare() {
        let helper = PerformanceHelper::without_file_storage();
        let mut ran = false;
        let err = helper.measure_scoped("fresh", || ran = true).unwrap_err();
        assert_eq!(err, MeasureError::NotPrepared("fresh".into()));
        assert!(!ran);
    }

    #[test]
    fn test_measure_prepares_implicitly() {
        let (helper, clock) = helper_with_clock();
        let value = helper
            .measure("fresh", || {
                clock.advance(Duration::from_millis(8));
                42
            })
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(
            helper.newest_timed_measurement("fresh").unwrap(),
            Duration::from_millis(8)
        );

        // Tokens are spent until the identifier is discarded
        assert_eq!(
            helper.measure("fresh", || ()).unwrap_err(),
            MeasureError::AlreadyStarted("fresh".into())
        );
        helper.discard_previous_results("fresh").unwrap();
        helper.measure("fresh", || ()).unwrap();
    }

    #[test]
    fn test_nested_scoped_fails_without_running_body() {
        let helper = PerformanceHelper::without_file_storage();
        helper.prepare_to_measure("outer").unwrap();
        helper.prepare_to_measure("inner").unwrap();
        helper.start_measuring("outer").unwrap();

        let mut ran = false;
        let err = helper.measure_scoped("inner", || ran = true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InterruptedMeasurement);
        assert!(!ran);

        helper.stop_measuring("outer").unwrap();
    }

    #[test]
    fn test_summary_applies_policy() {
        let helper = PerformanceHelper::without_file_storage();
        for _ in 0..12 {
            helper.record_untimed_measurement("ratio", 1.0).unwrap();
            helper.record_untimed_measurement("ratio", 1.1).unwrap();
        }
        helper.record_untimed_measurement("ratio", 50.0).unwrap();

        let summary = helper.untimed_summary("ratio").unwrap();
        assert_eq!(summary.sample_count, 25);
        assert_eq!(summary.outlier_count, 1);
        assert!((summary.mean - 1.05).abs() < 1e-9);
        assert_eq!(summary.max, 50.0);

        // Newest is always the raw latest sample
        assert_eq!(helper.newest_untimed_measurement("ratio").unwrap(), 50.0);
    }

    #[test]
    fn test_summary_without_results() {
        let helper = PerformanceHelper::without_file_storage();
        helper.record_untimed_measurement("only-untimed", 1.0).unwrap();
        assert_eq!(
            helper.timed_summary("only-untimed"),
            Err(MeasureError::NoResults("only-untimed".into()))
        );
        assert_eq!(
            helper.summary(IGNORED_IDENTIFIER, MeasurementKind::Timed),
            Ok(SummaryStatistics::empty())
        );
    }

    #[test]
    fn test_debug_output() {
        let helper = PerformanceHelper::without_file_storage();
        let debug = format!("{helper:?}");
        assert!(debug.contains("PerformanceHelper"));
        assert!(debug.contains("file_storage: false"));
    }
}
