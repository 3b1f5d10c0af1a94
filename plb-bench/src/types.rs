//! Core Types and Trait Definitions for plb-bench
//!
//! Defines the two collaborator seams of the benchmark:
//! - **ModelRunner:** ensures a model is served and turns a prompt into a response
//! - **CatalogLookup:** answers whether a (title, artist) pair exists in a music catalog
//!
//! The benchmark only talks to these traits, so the Ollama runner and the
//! MusicBrainz catalog can be swapped for scripted fakes in tests.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Model Runner
// ============================================================================

/// Raw response produced by a model invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResponse {
    /// UTF-8 text, expected to hold a JSON track list
    Text(String),
    /// Output bytes that are not valid UTF-8
    NotText(Vec<u8>),
}

impl ModelResponse {
    /// Classify raw process output
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::NotText(e.into_bytes()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::NotText(_) => None,
        }
    }

    /// Text recorded in the result's output column (lossy for non-text output)
    pub fn to_output_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::NotText(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl From<&str> for ModelResponse {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ModelResponse {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Model runner errors
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The model process ran but did not complete successfully
    #[error("model invocation failed: {}", .message.as_deref().unwrap_or("Unknown error"))]
    Invocation {
        /// Diagnostic output of the failed process (stderr), if any
        message: Option<String>,
    },

    /// The runner executable could not be started
    #[error("failed to launch '{binary}': {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The invocation exceeded the runner's timeout
    #[error("model invocation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error while talking to the child process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Message recorded in a failed trial's output column
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Invocation { message } => message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
            other => other.to_string(),
        }
    }
}

/// Language model runner
///
/// Implementations own process/server management for the models they serve.
/// Calls are made sequentially by the benchmark; implementations need not
/// support concurrent invocations of the same model.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Runner name for log output
    fn name(&self) -> &'static str;

    /// Whether the model is loaded and able to answer right now
    async fn is_ready(&self, model: &str) -> bool;

    /// Best-effort attempt to make the model ready
    async fn ensure_started(&self, model: &str) -> Result<(), RunnerError>;

    /// Send one prompt and return the model's raw response
    async fn invoke(&self, model: &str, prompt: &str) -> Result<ModelResponse, RunnerError>;
}

// ============================================================================
// Catalog Lookup
// ============================================================================

/// Answer from a catalog existence query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogVerdict {
    /// Track exists in the catalog
    pub found: bool,
    /// Human-readable account of the lookup, one transcript line
    pub description: String,
}

impl CatalogVerdict {
    pub fn found(description: impl Into<String>) -> Self {
        Self {
            found: true,
            description: description.into(),
        }
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        Self {
            found: false,
            description: description.into(),
        }
    }
}

/// Music catalog lookup
///
/// Infallible by signature: a lookup that cannot be completed is reported as
/// `found = false` with a description saying why.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn exists(&self, title: &str, artist: &str) -> CatalogVerdict;
}
