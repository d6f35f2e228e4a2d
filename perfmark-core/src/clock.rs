//! Monotonic Time Source
//!
//! All timed measurements read "now" through a [`Clock`]. Production code uses
//! [`MonotonicClock`], a thin wrapper over `std::time::Instant`; tests can
//! substitute [`ManualClock`] to advance time deterministically.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic instants
pub trait Clock: Send + Sync {
    /// Capture the current instant
    fn now(&self) -> Instant;

    /// Elapsed time between `start` and now (zero if the clock reads earlier)
    #[inline]
    fn elapsed_since(&self, start: Instant) -> Duration {
        self.now().saturating_duration_since(start)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the operating system's monotonic timer
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Starts at the instant it was created and advances by explicit calls to
/// [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    /// Total time advanced since creation
    pub fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_elapsed() {
        let clock = MonotonicClock;
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = clock.elapsed_since(start);

        // Should be at least 10ms
        assert!(elapsed >= Duration::from_millis(10));
        // Should be less than 1s (accounting for scheduling)
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_monotonic_never_goes_backwards() {
        let clock = MonotonicClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.elapsed_since(start), Duration::ZERO);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(750));

        assert_eq!(clock.elapsed_since(start), Duration::from_secs(1));
        assert_eq!(clock.offset(), Duration::from_secs(1));
    }

    #[test]
    fn test_elapsed_saturates() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_secs(1));
        let later = clock.now() + Duration::from_secs(5);
        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }
}
