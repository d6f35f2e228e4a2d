//! Exclusivity Guard
//!
//! Tracks the single real measurement that may be in flight. The bypass
//! identifier never reaches this type.

use crate::error::MeasureError;
use std::time::Instant;

/// Process-wide measurement state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// No real measurement is running
    #[default]
    Idle,
    /// `identifier` started measuring at `started_at`
    Active {
        /// Identifier holding the guard
        identifier: String,
        /// Instant the measurement started
        started_at: Instant,
    },
}

/// Enforces at most one active real measurement
#[derive(Debug, Default)]
pub struct ExclusivityGuard {
    state: GuardState,
}

impl ExclusivityGuard {
    /// Create an idle guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Identifier holding the guard, if any
    pub fn active_identifier(&self) -> Option<&str> {
        match &self.state {
            GuardState::Idle => None,
            GuardState::Active { identifier, .. } => Some(identifier),
        }
    }

    /// Whether no real measurement is running
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GuardState::Idle)
    }

    /// Fail with `Interrupted` unless idle
    pub fn ensure_idle(&self) -> Result<(), MeasureError> {
        match self.active_identifier() {
            None => Ok(()),
            Some(active) => Err(MeasureError::Interrupted {
                active: active.to_string(),
            }),
        }
    }

    /// Idle -> Active(identifier)
    pub fn activate(&mut self, identifier: &str, started_at: Instant) -> Result<(), MeasureError> {
        self.ensure_idle()?;
        self.state = GuardState::Active {
            identifier: identifier.to_string(),
            started_at,
        };
        Ok(())
    }

    /// Check that `identifier` holds the guard, returning its start instant
    pub fn check_release(&self, identifier: &str) -> Result<Instant, MeasureError> {
        match &self.state {
            GuardState::Active {
                identifier: active,
                started_at,
            } if active == identifier => Ok(*started_at),
            GuardState::Active {
                identifier: active,
                ..
            } => Err(MeasureError::MismatchedStop {
                active: active.clone(),
                requested: identifier.to_string(),
            }),
            GuardState::Idle => Err(MeasureError::NotStarted(identifier.to_string())),
        }
    }

    /// Active(identifier) -> Idle, returning the start instant
    pub fn release(&mut self, identifier: &str) -> Result<Instant, MeasureError> {
        let started_at = self.check_release(identifier)?;
        self.state = GuardState::Idle;
        Ok(started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_release() {
        let mut guard = ExclusivityGuard::new();
        let now = Instant::now();

        guard.activate("a", now).unwrap();
        assert_eq!(guard.active_identifier(), Some("a"));
        assert!(!guard.is_idle());

        assert_eq!(guard.release("a").unwrap(), now);
        assert!(guard.is_idle());
        assert_eq!(guard.state(), &GuardState::Idle);
    }

    #[test]
    fn test_no_nesting() {
        let mut guard = ExclusivityGuard::new();
        guard.activate("a", Instant::now()).unwrap();

        let err = guard.activate("b", Instant::now()).unwrap_err();
        assert_eq!(err, MeasureError::Interrupted { active: "a".into() });
        assert_eq!(guard.active_identifier(), Some("a"));
    }

    #[test]
    fn test_mismatched_release_keeps_state() {
        let mut guard = ExclusivityGuard::new();
        guard.activate("a", Instant::now()).unwrap();

        let err = guard.release("b").unwrap_err();
        assert_eq!(
            err,
            MeasureError::MismatchedStop {
                active: "a".into(),
                requested: "b".into()
            }
        );
        assert_eq!(guard.active_identifier(), Some("a"));
    }

    #[test]
    fn test_release_when_idle() {
        let mut guard = ExclusivityGuard::new();
        assert!(guard.release("a").is_err());
        assert!(guard.ensure_idle().is_ok());
    }
}
