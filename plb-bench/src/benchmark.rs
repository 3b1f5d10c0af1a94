//! Benchmark Orchestrator
//!
//! Runs every (model, prompt) pair of a [`TrialConfig`] exactly once, all
//! prompts of a model before moving to the next model. Trials are awaited one
//! at a time and isolated from each other: a failed invocation becomes an
//! error-tagged result and the run continues.
//!
//! After the last trial the report is written to the configured CSV file, if
//! any.

use crate::models::{RunReport, TrialConfig, TrialResult};
use crate::report::csv_writer;
use crate::services::ResponseValidator;
use crate::types::{CatalogLookup, ModelRunner};
use plb_common::config::ReadinessPolicy;
use plb_common::human_time::format_runtime;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Model/prompt benchmark
pub struct Benchmark {
    config: TrialConfig,
    runner: Arc<dyn ModelRunner>,
    validator: ResponseValidator,
    readiness: ReadinessPolicy,
    output_csv: Option<PathBuf>,
}

impl Benchmark {
    pub fn new(
        config: TrialConfig,
        runner: Arc<dyn ModelRunner>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            config,
            runner,
            validator: ResponseValidator::new(catalog),
            readiness: ReadinessPolicy::default(),
            output_csv: None,
        }
    }

    pub fn with_readiness_policy(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Write results to this CSV file after the run (`None` disables output)
    pub fn with_output_csv(mut self, path: Option<PathBuf>) -> Self {
        self.output_csv = path;
        self
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Run all trials, then write the CSV results file if one is configured
    ///
    /// Trial failures never fail the run; the only error is a failure to
    /// write the results file.
    pub async fn run(&self) -> plb_common::Result<RunReport> {
        let report = self.run_trials().await;

        if let Some(path) = &self.output_csv {
            csv_writer::write_csv(&report, path)?;
            info!(
                rows = report.len(),
                "Results written to {}",
                path.display()
            );
        }

        Ok(report)
    }

    /// Run all trials and return the report without writing anything
    pub async fn run_trials(&self) -> RunReport {
        let mut report = RunReport::new();

        info!(
            run_id = %report.run_id,
            runner = self.runner.name(),
            models = self.config.models.len(),
            prompts = self.config.prompts.len(),
            "Starting benchmark run"
        );

        for model in &self.config.models {
            info!(model = %model, "Starting model");
            let ready = self.prepare_model(model).await;

            for prompt in &self.config.prompts {
                let result = if !ready && self.readiness == ReadinessPolicy::Skip {
                    warn!(model = %model, prompt = %prompt, "Skipping trial, model not ready");
                    TrialResult::failed(model, prompt, 0.0, &format!("model {} not ready", model))
                } else {
                    self.run_single_trial(model, prompt).await
                };
                report.push(result);
            }
        }

        report.finish();
        report
    }

    /// Make sure the runner serves the model; returns whether it is ready
    async fn prepare_model(&self, model: &str) -> bool {
        if self.runner.is_ready(model).await {
            debug!(model = %model, "Model already running");
            return true;
        }

        info!(model = %model, "Model not running, starting it");
        match self.runner.ensure_started(model).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    model = %model,
                    error = %e,
                    "Could not start model, trials will fail if it is unavailable"
                );
                false
            }
        }
    }

    /// Run one timed trial; always yields exactly one result
    async fn run_single_trial(&self, model: &str, prompt: &str) -> TrialResult {
        info!(model = %model, prompt = %prompt, "=== Testing model ===");

        let start = Instant::now();

        match self.runner.invoke(model, prompt).await {
            Ok(response) => {
                let runtime = start.elapsed().as_secs_f64();
                debug!(model = %model, response = %response.to_output_string(), "Model response");
                info!("Time taken: {}", format_runtime(runtime));

                let outcome = self.validator.validate(&response).await;
                info!(
                    "Tracks parsed: {}, tracks found in catalog: {}",
                    outcome.tracks_parsed, outcome.tracks_found
                );

                TrialResult::completed(model, prompt, runtime, response.to_output_string(), outcome)
            }
            Err(e) => {
                let runtime = start.elapsed().as_secs_f64();
                let message = e.diagnostic();
                error!(model = %model, error = %message, "Error calling model runner");

                TrialResult::failed(model, prompt, runtime, &message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogVerdict, ModelResponse, RunnerError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Runner answering every prompt with the same track list
    struct EchoRunner {
        ready: bool,
        start_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl EchoRunner {
        fn new(ready: bool, start_fails: bool) -> Arc<Self> {
            Arc::new(Self {
                ready,
                start_fails,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelRunner for EchoRunner {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn is_ready(&self, model: &str) -> bool {
            self.calls.lock().unwrap().push(format!("is_ready {}", model));
            self.ready
        }

        async fn ensure_started(&self, model: &str) -> Result<(), RunnerError> {
            self.calls.lock().unwrap().push(format!("start {}", model));
            if self.start_fails {
                Err(RunnerError::Invocation {
                    message: Some("pull failed".to_string()),
                })
            } else {
                Ok(())
            }
        }

        async fn invoke(&self, model: &str, prompt: &str) -> Result<ModelResponse, RunnerError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("invoke {} {}", model, prompt));
            Ok(r#"[{"title":"A","artist":"X"}]"#.into())
        }
    }

    struct AlwaysFound;

    #[async_trait]
    impl CatalogLookup for AlwaysFound {
        async fn exists(&self, title: &str, _artist: &str) -> CatalogVerdict {
            CatalogVerdict::found(format!("found {}", title))
        }
    }

    fn config() -> TrialConfig {
        TrialConfig::new(
            vec!["m1".to_string(), "m2".to_string()],
            vec!["p1".to_string(), "p2".to_string()],
        )
    }

    #[tokio::test]
    async fn test_ready_model_is_not_started() {
        let runner = EchoRunner::new(true, false);
        let benchmark = Benchmark::new(config(), runner.clone(), Arc::new(AlwaysFound));

        let report = benchmark.run_trials().await;

        assert_eq!(report.len(), 4);
        assert!(!runner.calls().iter().any(|c| c.starts_with("start")));
        assert!(report.results().iter().all(|r| r.tracks_found == 1));
    }

    #[tokio::test]
    async fn test_model_started_once_before_its_prompts() {
        let runner = EchoRunner::new(false, false);
        let benchmark = Benchmark::new(config(), runner.clone(), Arc::new(AlwaysFound));

        benchmark.run_trials().await;

        assert_eq!(
            runner.calls(),
            vec![
                "is_ready m1",
                "start m1",
                "invoke m1 p1",
                "invoke m1 p2",
                "is_ready m2",
                "start m2",
                "invoke m2 p1",
                "invoke m2 p2",
            ]
        );
    }

    #[tokio::test]
    async fn test_start_failure_still_attempts_trials_by_default() {
        let runner = EchoRunner::new(false, true);
        let benchmark = Benchmark::new(config(), runner.clone(), Arc::new(AlwaysFound));

        let report = benchmark.run_trials().await;

        assert_eq!(report.len(), 4);
        assert_eq!(
            runner
                .calls()
                .iter()
                .filter(|c| c.starts_with("invoke"))
                .count(),
            4
        );
        assert!(report.results().iter().all(|r| !r.is_error()));
    }

    #[tokio::test]
    async fn test_skip_policy_records_error_results() {
        let runner = EchoRunner::new(false, true);
        let benchmark = Benchmark::new(config(), runner.clone(), Arc::new(AlwaysFound))
            .with_readiness_policy(ReadinessPolicy::Skip);

        let report = benchmark.run_trials().await;

        assert_eq!(report.len(), 4);
        assert!(!runner.calls().iter().any(|c| c.starts_with("invoke")));
        for result in report.results() {
            assert!(result.is_error());
            assert_eq!(result.output, format!("ERROR: model {} not ready", result.model));
            assert_eq!(result.runtime_sec, 0.0);
            assert_eq!(result.tracks_parsed, 0);
        }
    }

    #[tokio::test]
    async fn test_run_without_output_writes_nothing() {
        let benchmark = Benchmark::new(
            TrialConfig::default(),
            EchoRunner::new(true, false),
            Arc::new(AlwaysFound),
        );

        let report = benchmark.run().await.unwrap();
        assert!(report.is_empty());
        assert!(report.finished_at.is_some());
    }
}
