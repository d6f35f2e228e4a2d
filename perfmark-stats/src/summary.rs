//! Summary Statistics
//!
//! Aggregates over a result history:
//! - Mean, median, stddev computed from CLEANED data (outliers removed)
//! - Min, max computed from ALL data (outliers preserved)

use crate::outliers::{OutlierMethod, OutlierPolicy, detect_outliers, mean_and_std_dev};
use crate::percentiles::compute_median;
use serde::{Deserialize, Serialize};

/// Summary of one identifier's values of a single kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    // Central tendency (computed from CLEANED data)
    /// Mean of retained samples
    pub mean: f64,
    /// Median of retained samples
    pub median: f64,
    /// Standard deviation of retained samples
    pub std_dev: f64,

    // Extremes (computed from ALL data - outliers preserved)
    /// Smallest raw sample
    pub min: f64,
    /// Largest raw sample
    pub max: f64,

    /// Number of raw samples
    pub sample_count: usize,
    /// Number of samples excluded as outliers
    pub outlier_count: usize,
    /// Excluded samples below the lower bound
    #[serde(default)]
    pub low_outlier_count: usize,
    /// Excluded samples above the upper bound
    #[serde(default)]
    pub high_outlier_count: usize,
    /// Outlier method that was applied
    pub method: OutlierMethod,
}

impl SummaryStatistics {
    /// Summary of an empty history
    pub fn empty() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            sample_count: 0,
            outlier_count: 0,
            low_outlier_count: 0,
            high_outlier_count: 0,
            method: OutlierMethod::None,
        }
    }

    /// Coefficient of variation (relative stddev, percent)
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    /// Percentage of samples excluded as outliers
    pub fn outlier_percentage(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        (self.outlier_count as f64 / self.sample_count as f64) * 100.0
    }

    /// Number of samples that contributed to mean/median/stddev
    pub fn retained_count(&self) -> usize {
        self.sample_count - self.outlier_count
    }
}

/// Compute summary statistics with proper separation of cleaned vs raw data
pub fn compute_summary(samples: &[f64], outlier_method: OutlierMethod) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::empty();
    }

    let analysis = detect_outliers(samples, outlier_method);
    let cleaned = &analysis.cleaned_samples;
    let all = &analysis.all_samples;

    // Central tendency from CLEANED data
    let (mean, std_dev) = mean_and_std_dev(cleaned);
    let median = compute_median(cleaned);

    // Extremes from ALL data
    let min = all.iter().copied().fold(f64::INFINITY, f64::min);
    let max = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SummaryStatistics {
        mean,
        median,
        std_dev,
        min,
        max,
        sample_count: all.len(),
        outlier_count: analysis.outlier_count(),
        low_outlier_count: analysis.low_outlier_count,
        high_outlier_count: analysis.high_outlier_count,
        method: analysis.method,
    }
}

/// Compute summary statistics, letting the policy pick the outlier method
pub fn summarize_with_policy(samples: &[f64], policy: &OutlierPolicy) -> SummaryStatistics {
    compute_summary(samples, policy.method_for(samples.len()))
}
