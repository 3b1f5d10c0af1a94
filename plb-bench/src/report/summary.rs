//! Run summary rendering

use crate::models::RunReport;
use plb_common::human_time::{format_runtime, format_runtime_opt};
use tracing::info;

/// Render per-model aggregates as aligned text lines
pub fn render_summary(report: &RunReport) -> Vec<String> {
    let summaries = report.summaries();
    let width = summaries
        .iter()
        .map(|s| s.model.len())
        .max()
        .unwrap_or(0)
        .max("model".len());

    let mut lines = Vec::with_capacity(summaries.len() + 1);
    lines.push(format!(
        "{:<width$}  {:>6}  {:>6}  {:>10}  {:>6}  {:>5}  {:>7}",
        "model", "trials", "failed", "mean time", "parsed", "found", "found %"
    ));

    for s in &summaries {
        let ratio = s
            .found_ratio
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<width$}  {:>6}  {:>6}  {:>10}  {:>6}  {:>5}  {:>7}",
            s.model,
            s.trials,
            s.failed_trials,
            format_runtime(s.mean_runtime_sec),
            s.tracks_parsed,
            s.tracks_found,
            ratio
        ));
    }

    lines
}

/// Log the run summary
pub fn log_summary(report: &RunReport) {
    let elapsed = report
        .finished_at
        .map(|end| (end - report.started_at).num_milliseconds() as f64 / 1000.0);

    info!(
        run_id = %report.run_id,
        trials = report.len(),
        "Benchmark run complete in {}",
        format_runtime_opt(elapsed)
    );

    for line in render_summary(report) {
        info!("{}", line);
    }
}
