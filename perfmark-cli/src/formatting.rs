//! Output Formatting
//!
//! Human-readable rendering of history reports for the terminal.

use crate::report::{HistoryReport, IdentifierReport};
use perfmark_stats::SummaryStatistics;

/// Format seconds with an adaptive unit
pub fn format_duration(seconds: f64) -> String {
    let nanos = seconds * 1e9;
    if nanos < 1_000.0 {
        format!("{:.2} ns", nanos)
    } else if nanos < 1_000_000.0 {
        format!("{:.2} us", nanos / 1_000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else {
        format!("{:.3} s", seconds)
    }
}

/// One line per identifier with result counts
pub fn format_listing(report: &HistoryReport) -> String {
    let mut output = String::new();
    for entry in &report.identifiers {
        output.push_str(&format!(
            "{}  (timed: {}, untimed: {})\n",
            entry.identifier, entry.timed_count, entry.untimed_count
        ));
    }
    output.push_str(&format!("{} identifiers stored.\n", report.identifiers.len()));
    output
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &HistoryReport) -> String {
    let mut output = String::new();

    output.push_str("Perfmark History\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    if report.policy.remove_beyond_two_std_devs {
        output.push_str(&format!(
            "Outliers beyond 2σ excluded from aggregates once {} results exist\n",
            report.policy.minimum_sample_count
        ));
    }
    output.push('\n');

    for entry in &report.identifiers {
        format_identifier(&mut output, entry);
    }

    if report.identifiers.is_empty() {
        output.push_str("No stored results.\n");
    }
    output
}

fn format_identifier(output: &mut String, entry: &IdentifierReport) {
    output.push_str(&format!("{}\n", entry.identifier));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    if let Some(stats) = &entry.timed {
        output.push_str(&format!(
            "  timed    newest: {}  results: {}\n",
            entry
                .newest_timed_secs
                .map(format_duration)
                .unwrap_or_else(|| "-".to_string()),
            entry.timed_count
        ));
        push_stats(output, stats, format_duration);
    }

    if let Some(stats) = &entry.untimed {
        output.push_str(&format!(
            "  untimed  newest: {}  results: {}\n",
            entry
                .newest_untimed
                .map(|v| format!("{v}"))
                .unwrap_or_else(|| "-".to_string()),
            entry.untimed_count
        ));
        push_stats(output, stats, |v| format!("{v:.4}"));
    }
    output.push('\n');
}

fn push_stats(output: &mut String, stats: &SummaryStatistics, fmt: impl Fn(f64) -> String) {
    output.push_str(&format!(
        "      mean: {}  median: {}  stddev: {}\n",
        fmt(stats.mean),
        fmt(stats.median),
        fmt(stats.std_dev)
    ));
    output.push_str(&format!(
        "      min: {}  max: {}  outliers: {}/{} ({:.1}%, low: {}, high: {})\n",
        fmt(stats.min),
        fmt(stats.max),
        stats.outlier_count,
        stats.sample_count,
        stats.outlier_percentage(),
        stats.low_outlier_count,
        stats.high_outlier_count
    ));
}
