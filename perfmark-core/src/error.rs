//! Measurement Errors

use thiserror::Error;

/// Coarse classification of a [`MeasureError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad, unknown, or misused identifier (including "no results available")
    Identifier,
    /// The call conflicts with a real measurement that is in flight
    InterruptedMeasurement,
}

/// Errors returned by measurement lifecycle operations
///
/// Every failing operation leaves guard, lifecycle, and history state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// Empty or absent identifier
    #[error("Identifier must not be empty")]
    EmptyIdentifier,

    /// Prepared twice without a discard in between
    #[error("Identifier already prepared: {0}")]
    AlreadyPrepared(String),

    /// Start or stop for an identifier that was never prepared
    #[error("Identifier not prepared: {0}")]
    NotPrepared(String),

    /// Start token already consumed
    #[error("Measurement already started for identifier: {0}")]
    AlreadyStarted(String),

    /// Stop without a running measurement
    #[error("Measurement never started for identifier: {0}")]
    NotStarted(String),

    /// Stop token already consumed
    #[error("Measurement already stopped for identifier: {0}")]
    AlreadyStopped(String),

    /// Stop for an identifier other than the active one
    #[error("Stop for {requested} does not match active measurement {active}")]
    MismatchedStop {
        /// Identifier holding the guard
        active: String,
        /// Identifier passed to stop
        requested: String,
    },

    /// Nothing of the requested kind has been recorded
    #[error("No results available for identifier: {0}")]
    NoResults(String),

    /// A real measurement is in flight
    #[error("Measurement of {active} is in progress")]
    Interrupted {
        /// Identifier holding the guard
        active: String,
    },
}

impl MeasureError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeasureError::Interrupted { .. } => ErrorKind::InterruptedMeasurement,
            _ => ErrorKind::Identifier,
        }
    }

    /// Whether this error was caused by an in-flight measurement
    pub fn is_interrupted(&self) -> bool {
        self.kind() == ErrorKind::InterruptedMeasurement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(MeasureError::EmptyIdentifier.kind(), ErrorKind::Identifier);
        assert_eq!(
            MeasureError::NoResults("x".into()).kind(),
            ErrorKind::Identifier
        );
        assert_eq!(
            MeasureError::MismatchedStop {
                active: "a".into(),
                requested: "b".into()
            }
            .kind(),
            ErrorKind::Identifier
        );
        assert!(
            MeasureError::Interrupted {
                active: "a".into()
            }
            .is_interrupted()
        );
    }

    #[test]
    fn test_display() {
        let err = MeasureError::MismatchedStop {
            active: "load".into(),
            requested: "save".into(),
        };
        assert_eq!(
            err.to_string(),
            "Stop for save does not match active measurement load"
        );
    }
}
