//! History Report
//!
//! Aggregates stored histories into per-identifier summaries. Each identifier
//! is summarized independently, so the work is spread across the Rayon pool.

use perfmark_core::{History, Measurement, MeasurementKind};
use perfmark_stats::{OutlierPolicy, SummaryStatistics, summarize_with_policy};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one stored identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierReport {
    /// Identifier the history is stored under
    pub identifier: String,
    /// Number of timed results
    pub timed_count: usize,
    /// Number of untimed results
    pub untimed_count: usize,
    /// Statistics over timed results, in seconds
    pub timed: Option<SummaryStatistics>,
    /// Statistics over untimed results
    pub untimed: Option<SummaryStatistics>,
    /// Most recent timed result, in seconds
    pub newest_timed_secs: Option<f64>,
    /// Most recent untimed result
    pub newest_untimed: Option<f64>,
}

/// Summaries of every selected identifier, sorted by identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryReport {
    /// Policy applied to the aggregates
    pub policy: OutlierPolicy,
    /// One entry per identifier
    pub identifiers: Vec<IdentifierReport>,
}

/// Keep the identifiers matching `filter`
pub fn select<'a>(
    histories: &'a BTreeMap<String, Vec<Measurement>>,
    filter: Option<&Regex>,
) -> Vec<(&'a str, &'a [Measurement])> {
    histories
        .iter()
        .filter(|(id, _)| filter.is_none_or(|re| re.is_match(id)))
        .map(|(id, entries)| (id.as_str(), entries.as_slice()))
        .collect()
}

/// Summarize one identifier's history
pub fn summarize_identifier(
    identifier: &str,
    entries: &[Measurement],
    policy: &OutlierPolicy,
) -> IdentifierReport {
    let history = History::from_entries(entries.iter().cloned(), entries.len().max(1));

    let summarize = |kind| {
        let values = history.values(kind);
        (!values.is_empty()).then(|| summarize_with_policy(&values, policy))
    };

    IdentifierReport {
        identifier: identifier.to_string(),
        timed_count: history.count(MeasurementKind::Timed),
        untimed_count: history.count(MeasurementKind::Untimed),
        timed: summarize(MeasurementKind::Timed),
        untimed: summarize(MeasurementKind::Untimed),
        newest_timed_secs: history.newest(MeasurementKind::Timed).map(Measurement::as_f64),
        newest_untimed: history
            .newest(MeasurementKind::Untimed)
            .and_then(Measurement::untimed_value),
    }
}

/// Build the report for every selected identifier (parallelized with Rayon)
pub fn build_report(
    histories: &BTreeMap<String, Vec<Measurement>>,
    filter: Option<&Regex>,
    policy: OutlierPolicy,
) -> HistoryReport {
    let selected = select(histories, filter);
    let identifiers = selected
        .par_iter()
        .map(|(id, entries)| summarize_identifier(id, entries, &policy))
        .collect();

    HistoryReport {
        policy,
        identifiers,
    }
}
