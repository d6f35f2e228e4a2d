//! Configuration loading from perfmark.toml
//!
//! The configuration is fixed for the lifetime of a `PerformanceHelper`. It can
//! be built in code, or discovered by walking up from the current directory
//! looking for a `perfmark.toml` file.

use perfmark_core::DEFAULT_HISTORY_CAPACITY;
use perfmark_stats::OutlierPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "perfmark.toml";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid configuration TOML
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Behaviour of a `PerformanceHelper`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Emit a log line per completed measurement
    #[serde(default = "default_true")]
    pub print_measurement_log: bool,
    /// Exclude samples beyond mean ± 2σ from aggregates
    #[serde(default = "default_true")]
    pub remove_results_exceeding_two_standard_deviations: bool,
    /// Sample count before outlier exclusion applies
    #[serde(default = "default_minimum_result_count")]
    pub minimum_result_count_for_evaluation: usize,
    /// History cap per identifier
    #[serde(default = "default_results_to_persist")]
    pub number_of_results_to_persist: usize,
    /// Route history through the durable store
    #[serde(default = "default_true")]
    pub use_file_storage: bool,
    /// Location of the history document when file storage is enabled
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            print_measurement_log: true,
            remove_results_exceeding_two_standard_deviations: true,
            minimum_result_count_for_evaluation: default_minimum_result_count(),
            number_of_results_to_persist: default_results_to_persist(),
            use_file_storage: true,
            storage_path: default_storage_path(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_minimum_result_count() -> usize {
    10
}
fn default_results_to_persist() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("target/perfmark/history.json")
}

impl HelperConfig {
    /// Defaults with file storage disabled, so tests persist nothing
    pub fn for_unit_tests() -> Self {
        Self {
            use_file_storage: false,
            ..Self::default()
        }
    }

    /// History cap actually applied (never below 1)
    pub fn history_capacity(&self) -> usize {
        self.number_of_results_to_persist.max(1)
    }

    /// Outlier policy for aggregates
    pub fn outlier_policy(&self) -> OutlierPolicy {
        OutlierPolicy {
            remove_beyond_two_std_devs: self.remove_results_exceeding_two_standard_deviations,
            minimum_sample_count: self.minimum_result_count_for_evaluation,
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `perfmark.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(
                            target: "perfmark",
                            path = %config_path.display(),
                            error = %e,
                            "ignoring unreadable configuration"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Perfmark Configuration

# Log a line for every completed measurement
print_measurement_log = true

# Exclude samples beyond mean +/- 2 standard deviations from aggregates
remove_results_exceeding_two_standard_deviations = true
# Number of samples required before outlier exclusion applies
minimum_result_count_for_evaluation = 10

# Results kept per identifier (oldest evicted first)
number_of_results_to_persist = 200

# Persist result history between runs
use_file_storage = true
storage_path = "target/perfmark/history.json"
"#
        .to_string()
    }
}
