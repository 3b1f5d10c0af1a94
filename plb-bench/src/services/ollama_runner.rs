//! Ollama model runner
//!
//! Drives the `ollama` command-line tool:
//! - `ollama ps` lists loaded models (readiness)
//! - `ollama serve` starts the server when it is not answering
//! - `ollama run <model> <prompt>` produces one response
//!
//! A non-zero exit status is reported as [`RunnerError::Invocation`] carrying
//! the trimmed stderr of the process.

use crate::types::{ModelResponse, ModelRunner, RunnerError};
use async_trait::async_trait;
use plb_common::config::OllamaConfig;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Ollama CLI runner
#[derive(Debug, Clone)]
pub struct OllamaRunner {
    binary: String,
    host: Option<String>,
    startup_grace: Duration,
    invoke_timeout: Option<Duration>,
}

impl OllamaRunner {
    /// Create runner for the given executable with default settings
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            host: None,
            startup_grace: Duration::from_secs(5),
            invoke_timeout: None,
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            host: config.host.clone(),
            startup_grace: Duration::from_secs(config.startup_grace_secs),
            invoke_timeout: config.invoke_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Export OLLAMA_HOST to every child process
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = Some(timeout);
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(host) = &self.host {
            cmd.env("OLLAMA_HOST", host);
        }
        cmd
    }

    /// Run the CLI to completion and capture its output
    async fn run_cli(&self, args: &[&str], timeout: Option<Duration>) -> Result<Output, RunnerError> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| RunnerError::Timeout(limit))?,
            None => cmd.output().await,
        };

        output.map_err(|e| self.launch_error(e))
    }

    fn launch_error(&self, e: std::io::Error) -> RunnerError {
        if e.kind() == std::io::ErrorKind::NotFound {
            RunnerError::Launch {
                binary: self.binary.clone(),
                source: e,
            }
        } else {
            RunnerError::Io(e)
        }
    }

    /// Names of the models currently loaded by the server
    pub async fn running_models(&self) -> Result<Vec<String>, RunnerError> {
        let output = self.run_cli(&["ps"], None).await?;
        if !output.status.success() {
            return Err(RunnerError::Invocation {
                message: stderr_message(&output.stderr),
            });
        }
        Ok(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Spawn `ollama serve` detached from this process
    fn spawn_server(&self) -> Result<(), RunnerError> {
        let mut cmd = self.command();
        cmd.arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Dropping the handle leaves the server running
        cmd.spawn().map(|_child| ()).map_err(|e| self.launch_error(e))
    }
}

impl Default for OllamaRunner {
    fn default() -> Self {
        Self::new("ollama")
    }
}

#[async_trait]
impl ModelRunner for OllamaRunner {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn is_ready(&self, model: &str) -> bool {
        match self.running_models().await {
            Ok(models) => models.iter().any(|listed| model_matches(listed, model)),
            Err(e) => {
                debug!(model = %model, error = %e, "Ollama readiness check failed");
                false
            }
        }
    }

    async fn ensure_started(&self, model: &str) -> Result<(), RunnerError> {
        if let Err(e) = self.running_models().await {
            info!(error = %e, "Ollama server not answering, starting `{} serve`", self.binary);
            self.spawn_server()?;
            tokio::time::sleep(self.startup_grace).await;
        }

        info!(model = %model, "Loading model");
        let output = self.run_cli(&["run", model], None).await?;
        if !output.status.success() {
            let message = stderr_message(&output.stderr);
            warn!(model = %model, error = ?message, "Model failed to load");
            return Err(RunnerError::Invocation { message });
        }
        Ok(())
    }

    async fn invoke(&self, model: &str, prompt: &str) -> Result<ModelResponse, RunnerError> {
        let output = self.run_cli(&["run", model, prompt], self.invoke_timeout).await?;

        if !output.status.success() {
            return Err(RunnerError::Invocation {
                message: stderr_message(&output.stderr),
            });
        }

        Ok(match ModelResponse::from_bytes(output.stdout) {
            ModelResponse::Text(text) => ModelResponse::Text(text.trim_end().to_string()),
            other => other,
        })
    }
}

/// Extract model names from `ollama ps` output
///
/// The first line is a column header starting with NAME; the model name is
/// the first whitespace-separated field of every following line.
pub fn parse_ps_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with("NAME"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Whether a listed model name refers to the requested model
///
/// A bare name matches its `:latest` tag in either direction.
pub fn model_matches(listed: &str, requested: &str) -> bool {
    fn normalize(name: &str) -> &str {
        name.strip_suffix(":latest").unwrap_or(name)
    }
    normalize(listed) == normalize(requested)
}

/// Trimmed stderr, or `None` when the process wrote nothing
fn stderr_message(stderr: &[u8]) -> Option<String> {
    let message = String::from_utf8_lossy(stderr).trim().to_string();
    (!message.is_empty()).then_some(message)
}
