//! Outlier Detection
//!
//! Samples further than `k` standard deviations from the sample mean are
//! treated as outliers. Outliers are excluded from mean/median/stddev only;
//! the raw history (and "newest" lookups) never changes.

use serde::{Deserialize, Serialize};

/// Method for outlier detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Outliers lie outside mean ± k standard deviations
    StdDev {
        /// Number of standard deviations
        k: u32,
    },
    /// No outlier detection
    None,
}

/// Exclude samples beyond mean ± 2σ
pub const TWO_STANDARD_DEVIATIONS: OutlierMethod = OutlierMethod::StdDev { k: 2 };

impl Default for OutlierMethod {
    fn default() -> Self {
        TWO_STANDARD_DEVIATIONS
    }
}

/// When outlier exclusion applies to a history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierPolicy {
    /// Exclude samples beyond two standard deviations
    pub remove_beyond_two_std_devs: bool,
    /// Minimum sample count before exclusion kicks in
    pub minimum_sample_count: usize,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            remove_beyond_two_std_devs: true,
            minimum_sample_count: 10,
        }
    }
}

impl OutlierPolicy {
    /// Policy that never excludes anything
    pub fn disabled() -> Self {
        Self {
            remove_beyond_two_std_devs: false,
            minimum_sample_count: 0,
        }
    }

    /// Detection method to use for a history of `sample_count` values
    pub fn method_for(&self, sample_count: usize) -> OutlierMethod {
        if self.remove_beyond_two_std_devs && sample_count >= self.minimum_sample_count {
            TWO_STANDARD_DEVIATIONS
        } else {
            OutlierMethod::None
        }
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone)]
pub struct OutlierAnalysis {
    /// Original samples (ALL data preserved)
    pub all_samples: Vec<f64>,
    /// Samples with outliers removed (for mean/stddev computation)
    pub cleaned_samples: Vec<f64>,
    /// Indices of outlier samples
    pub outlier_indices: Vec<usize>,
    /// Number of low outliers (below lower bound)
    pub low_outlier_count: usize,
    /// Number of high outliers (above upper bound)
    pub high_outlier_count: usize,
    /// Lower bound used for detection
    pub lower_bound: f64,
    /// Upper bound used for detection
    pub upper_bound: f64,
    /// Detection method used
    pub method: OutlierMethod,
}

impl OutlierAnalysis {
    fn unfiltered(samples: &[f64], lower_bound: f64, upper_bound: f64, method: OutlierMethod) -> Self {
        Self {
            all_samples: samples.to_vec(),
            cleaned_samples: samples.to_vec(),
            outlier_indices: Vec::new(),
            low_outlier_count: 0,
            high_outlier_count: 0,
            lower_bound,
            upper_bound,
            method,
        }
    }

    /// Number of samples excluded
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }
}

/// Sample mean and (Bessel-corrected) standard deviation
pub fn mean_and_std_dev(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if samples.len() < 2 {
        return (mean, 0.0);
    }
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Detect outliers in samples using specified method
///
/// # Examples
///
/// ```
/// # use perfmark_stats::{detect_outliers, OutlierMethod};
/// let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
/// let analysis = detect_outliers(&samples, OutlierMethod::StdDev { k: 2 });
/// assert_eq!(analysis.outlier_count(), 1);
/// assert_eq!(analysis.cleaned_samples.len(), 5);
/// ```
pub fn detect_outliers(samples: &[f64], method: OutlierMethod) -> OutlierAnalysis {
    if samples.is_empty() {
        return OutlierAnalysis::unfiltered(samples, 0.0, 0.0, method);
    }

    match method {
        OutlierMethod::None => {
            OutlierAnalysis::unfiltered(samples, f64::NEG_INFINITY, f64::INFINITY, method)
        }
        OutlierMethod::StdDev { k } => detect_std_dev_outliers(samples, k),
    }
}

fn detect_std_dev_outliers(samples: &[f64], k: u32) -> OutlierAnalysis {
    let method = OutlierMethod::StdDev { k };
    let (mean, std_dev) = mean_and_std_dev(samples);

    if std_dev == 0.0 {
        // No variance, no outliers
        return OutlierAnalysis::unfiltered(samples, mean, mean, method);
    }

    let lower_bound = mean - k as f64 * std_dev;
    let upper_bound = mean + k as f64 * std_dev;

    let mut outlier_indices = Vec::new();
    let mut low_count = 0;
    let mut high_count = 0;
    let mut cleaned = Vec::with_capacity(samples.len());

    for (i, &sample) in samples.iter().enumerate() {
        if sample < lower_bound {
            outlier_indices.push(i);
            low_count += 1;
        } else if sample > upper_bound {
            outlier_indices.push(i);
            high_count += 1;
        } else {
            cleaned.push(sample);
        }
    }

    OutlierAnalysis {
        all_samples: samples.to_vec(),
        cleaned_samples: cleaned,
        outlier_indices,
        low_outlier_count: low_count,
        high_outlier_count: high_count,
        lower_bound,
        upper_bound,
        method,
    }
}
