#![warn(missing_docs)]
//! Perfmark Statistical Engine
//!
//! Aggregates computed on top of a result history:
//! - Outlier detection via mean ± k standard deviations
//! - A policy gating exclusion on a minimum sample count
//! - Summary statistics (mean/median/stddev on cleaned data, min/max on raw data)

mod outliers;
mod percentiles;
mod summary;

pub use outliers::{
    OutlierAnalysis, OutlierMethod, OutlierPolicy, TWO_STANDARD_DEVIATIONS, detect_outliers,
    mean_and_std_dev,
};
pub use percentiles::{compute_median, compute_percentile};
pub use summary::{SummaryStatistics, compute_summary, summarize_with_policy};
