//! Trial configuration, per-trial results and the run report

use crate::models::track::ValidationOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Prefix of the output column for trials whose model invocation failed
pub const ERROR_OUTPUT_PREFIX: &str = "ERROR: ";

/// Models and prompts to benchmark
///
/// Every (model, prompt) pair runs exactly once, all prompts of a model
/// before the next model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialConfig {
    pub models: Vec<String>,
    pub prompts: Vec<String>,
}

impl TrialConfig {
    pub fn new(models: Vec<String>, prompts: Vec<String>) -> Self {
        Self { models, prompts }
    }

    /// Number of trials a complete run produces
    pub fn trial_count(&self) -> usize {
        self.models.len() * self.prompts.len()
    }

    /// All (model, prompt) pairs in run order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.models.iter().flat_map(move |model| {
            self.prompts
                .iter()
                .map(move |prompt| (model.as_str(), prompt.as_str()))
        })
    }
}

/// Outcome of one (model, prompt) trial
///
/// Field order is the column order of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub model: String,
    pub prompt: String,
    /// Wall-clock seconds spent in the model invocation
    pub runtime_sec: f64,
    /// Raw model output, or `ERROR: <message>` when the invocation failed
    pub output: String,
    pub tracks_parsed: usize,
    pub tracks_found: usize,
    /// Catalog transcript or parse diagnostic
    pub check_results: String,
}

impl TrialResult {
    /// Result of a trial whose model invocation returned a response
    pub fn completed(
        model: &str,
        prompt: &str,
        runtime_sec: f64,
        output: String,
        outcome: ValidationOutcome,
    ) -> Self {
        debug_assert!(outcome.tracks_found <= outcome.tracks_parsed);
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            runtime_sec: runtime_sec.max(0.0),
            output,
            tracks_parsed: outcome.tracks_parsed,
            tracks_found: outcome.tracks_found,
            check_results: outcome.check_results,
        }
    }

    /// Result of a trial whose model invocation failed
    pub fn failed(model: &str, prompt: &str, runtime_sec: f64, message: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            runtime_sec: runtime_sec.max(0.0),
            output: format!("{}{}", ERROR_OUTPUT_PREFIX, message),
            tracks_parsed: 0,
            tracks_found: 0,
            check_results: String::new(),
        }
    }

    /// Whether this trial records an invocation failure
    pub fn is_error(&self) -> bool {
        self.output.starts_with(ERROR_OUTPUT_PREFIX)
    }
}

/// Aggregate statistics for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub model: String,
    pub trials: usize,
    pub failed_trials: usize,
    pub total_runtime_sec: f64,
    pub mean_runtime_sec: f64,
    pub tracks_parsed: usize,
    pub tracks_found: usize,
    /// `tracks_found / tracks_parsed`, `None` when nothing was parsed
    pub found_ratio: Option<f64>,
}

/// All trial results of one benchmark run, in production order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    results: Vec<TrialResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, result: TrialResult) {
        self.results.push(result);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Per-model aggregates, in order of each model's first result
    pub fn summaries(&self) -> Vec<ModelSummary> {
        let mut summaries: Vec<ModelSummary> = Vec::new();

        for result in &self.results {
            let index = match summaries.iter().position(|s| s.model == result.model) {
                Some(index) => index,
                None => {
                    summaries.push(ModelSummary {
                        model: result.model.clone(),
                        trials: 0,
                        failed_trials: 0,
                        total_runtime_sec: 0.0,
                        mean_runtime_sec: 0.0,
                        tracks_parsed: 0,
                        tracks_found: 0,
                        found_ratio: None,
                    });
                    summaries.len() - 1
                }
            };

            let summary = &mut summaries[index];
            summary.trials += 1;
            if result.is_error() {
                summary.failed_trials += 1;
            }
            summary.total_runtime_sec += result.runtime_sec;
            summary.tracks_parsed += result.tracks_parsed;
            summary.tracks_found += result.tracks_found;
        }

        for summary in &mut summaries {
            summary.mean_runtime_sec = summary.total_runtime_sec / summary.trials as f64;
            summary.found_ratio = (summary.tracks_parsed > 0)
                .then(|| summary.tracks_found as f64 / summary.tracks_parsed as f64);
        }

        summaries
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
