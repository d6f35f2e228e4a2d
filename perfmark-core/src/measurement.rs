//! Measurement Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which kind of value a measurement holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Elapsed time between start and stop
    Timed,
    /// Externally computed float
    Untimed,
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementKind::Timed => f.write_str("timed"),
            MeasurementKind::Untimed => f.write_str("untimed"),
        }
    }
}

/// The measured value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementValue {
    /// Elapsed time of a start/stop pair
    Timed {
        /// Measured duration
        duration: Duration,
    },
    /// Value recorded by the host
    Untimed {
        /// Recorded value
        #[serde(with = "any_float")]
        value: f64,
    },
}

/// JSON has no NaN or infinity, so non-finite values are written as strings.
mod any_float {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float: {other}"))),
            },
        }
    }
}

/// One entry in an identifier's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured value
    pub value: MeasurementValue,
    /// Wall-clock time the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

impl Measurement {
    /// Timed entry stamped with the current time
    pub fn timed(duration: Duration) -> Self {
        Self {
            value: MeasurementValue::Timed { duration },
            recorded_at: Utc::now(),
        }
    }

    /// Untimed entry stamped with the current time
    pub fn untimed(value: f64) -> Self {
        Self {
            value: MeasurementValue::Untimed { value },
            recorded_at: Utc::now(),
        }
    }

    /// Kind of this entry
    pub fn kind(&self) -> MeasurementKind {
        match self.value {
            MeasurementValue::Timed { .. } => MeasurementKind::Timed,
            MeasurementValue::Untimed { .. } => MeasurementKind::Untimed,
        }
    }

    /// Duration if this is a timed entry
    pub fn duration(&self) -> Option<Duration> {
        match self.value {
            MeasurementValue::Timed { duration } => Some(duration),
            MeasurementValue::Untimed { .. } => None,
        }
    }

    /// Value if this is an untimed entry
    pub fn untimed_value(&self) -> Option<f64> {
        match self.value {
            MeasurementValue::Timed { .. } => None,
            MeasurementValue::Untimed { value } => Some(value),
        }
    }

    /// Numeric value for statistics (seconds for timed entries)
    pub fn as_f64(&self) -> f64 {
        match self.value {
            MeasurementValue::Timed { duration } => duration.as_secs_f64(),
            MeasurementValue::Untimed { value } => value,
        }
    }
}
