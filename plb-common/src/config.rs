//! Configuration loading and resolution
//!
//! Bootstrap configuration is a single TOML file. Its location is resolved in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PLB_CONFIG`)
//! 3. User config directory (`<config_dir>/playlist-bench/config.toml`)
//! 4. Built-in defaults (fallback)
//!
//! An explicitly named file (1 or 2) must exist and parse. A missing file at
//! the default location is not an error: built-in defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PLB_CONFIG";

const CONFIG_DIR_NAME: &str = "playlist-bench";
const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
const DEFAULT_USER_AGENT: &str = concat!("playlist-bench/", env!("CARGO_PKG_VERSION"));

/// What to do when a model cannot be confirmed ready before its trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessPolicy {
    /// Run the model's trials anyway; failures surface as invocation errors
    #[default]
    Attempt,
    /// Record an error result for each of the model's prompts without invoking it
    Skip,
}

impl FromStr for ReadinessPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attempt" => Ok(Self::Attempt),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown readiness policy '{}' (expected 'attempt' or 'skip')",
                other
            )),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    /// Model identifiers, benchmarked in this order
    pub models: Vec<String>,

    /// Prompts sent to every model, in this order
    pub prompts: Vec<String>,

    /// CSV results file (no file is written when unset)
    pub output_csv: Option<PathBuf>,

    /// Readiness failure handling
    pub readiness: ReadinessPolicy,

    /// Ollama model runner settings
    pub ollama: OllamaConfig,

    /// MusicBrainz catalog settings
    pub catalog: CatalogConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Ollama model runner settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OllamaConfig {
    /// Path or name of the `ollama` executable
    pub binary: String,

    /// Value exported as OLLAMA_HOST to child processes
    pub host: Option<String>,

    /// Seconds to wait after spawning `ollama serve`
    pub startup_grace_secs: u64,

    /// Per-invocation timeout in seconds (no timeout when unset)
    pub invoke_timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            binary: "ollama".to_string(),
            host: None,
            startup_grace_secs: 5,
            invoke_timeout_secs: None,
        }
    }
}

/// MusicBrainz catalog settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// WS/2 base URL
    pub base_url: String,

    /// User-Agent header (required by MusicBrainz)
    pub user_agent: String,

    /// Minimum interval between requests in milliseconds
    pub rate_limit_ms: u64,

    /// Maximum recordings requested per search
    pub search_limit: u32,

    /// Jaro-Winkler similarity required for title and artist (0.0-1.0)
    pub match_threshold: f64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MUSICBRAINZ_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_ms: 1000,
            search_limit: 10,
            match_threshold: 0.85,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.ollama.binary.trim().is_empty() {
            return Err(Error::Config("ollama.binary must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.catalog.match_threshold) {
            return Err(Error::Config(format!(
                "catalog.match_threshold must be between 0.0 and 1.0 (got {})",
                self.catalog.match_threshold
            )));
        }
        if self.catalog.search_limit == 0 {
            return Err(Error::Config(
                "catalog.search_limit must be at least 1".to_string(),
            ));
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err(Error::Config("model identifiers must not be blank".to_string()));
        }
        Ok(())
    }
}

/// Where the config file location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    CommandLine,
    Environment,
    UserConfigDir,
}

/// Resolves and loads the bootstrap configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve the config file location without reading it
    pub fn resolve_path(&self) -> Option<(PathBuf, ConfigOrigin)> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some((path.clone(), ConfigOrigin::CommandLine));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), ConfigOrigin::Environment));
            }
        }

        // Priority 3: User config directory
        dirs::config_dir().map(|d| {
            (
                d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
                ConfigOrigin::UserConfigDir,
            )
        })
    }

    /// Load configuration, falling back to defaults when no file applies
    pub fn load(&self) -> Result<TomlConfig> {
        let config = match self.resolve_path() {
            Some((path, ConfigOrigin::UserConfigDir)) if !path.exists() => {
                info!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            Some((path, origin)) => {
                info!(?origin, "Loading config from {}", path.display());
                load_toml_config(&path)?
            }
            None => {
                info!("Could not determine config directory, using built-in defaults");
                TomlConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read config {} failed: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))
}

/// Read prompts from a text file, one prompt per non-empty line
pub fn load_prompts_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
