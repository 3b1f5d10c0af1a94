//! plb-bench - Playlist generation benchmark
//!
//! Runs each configured Ollama model against each prompt, times the
//! responses, verifies the returned tracks against MusicBrainz, and writes
//! one CSV row per (model, prompt) pair.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use plb_bench::report::log_summary;
use plb_bench::services::{MusicBrainzCatalog, OllamaRunner};
use plb_bench::{Benchmark, TrialConfig};
use plb_common::config::{load_prompts_file, ConfigResolver, LoggingConfig, ReadinessPolicy};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for plb-bench
#[derive(Parser, Debug)]
#[command(name = "plb-bench")]
#[command(about = "Benchmark LLM playlist generation against the MusicBrainz catalog")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: PLB_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to benchmark (repeatable; replaces the configured models)
    #[arg(short = 'm', long = "model")]
    models: Vec<String>,

    /// Prompt to send (repeatable; replaces the configured prompts)
    #[arg(short = 'p', long = "prompt")]
    prompts: Vec<String>,

    /// File with one prompt per line (added to --prompt values)
    #[arg(long)]
    prompts_file: Option<PathBuf>,

    /// CSV results file (overrides output_csv from the config)
    #[arg(short, long, conflicts_with = "no_output")]
    output: Option<PathBuf>,

    /// Do not write a results file
    #[arg(long)]
    no_output: bool,

    /// Readiness failure policy: attempt or skip
    #[arg(long)]
    readiness: Option<ReadinessPolicy>,

    /// Ollama executable (overrides ollama.binary from the config)
    #[arg(long, env = "PLB_OLLAMA_BIN")]
    ollama_bin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    info!("Starting plb-bench v{}", env!("CARGO_PKG_VERSION"));

    // Command-line lists replace the configured ones
    if !args.models.is_empty() {
        config.models = args.models.clone();
    }
    let mut prompts = args.prompts.clone();
    if let Some(path) = &args.prompts_file {
        let from_file = load_prompts_file(path)
            .with_context(|| format!("Failed to read prompts from {}", path.display()))?;
        prompts.extend(from_file);
    }
    if !prompts.is_empty() {
        config.prompts = prompts;
    }
    if let Some(binary) = &args.ollama_bin {
        config.ollama.binary = binary.clone();
    }
    let readiness = args.readiness.unwrap_or(config.readiness);
    let output_csv = if args.no_output {
        None
    } else {
        args.output.clone().or_else(|| config.output_csv.clone())
    };

    let trials = TrialConfig::new(config.models.clone(), config.prompts.clone());
    if trials.trial_count() == 0 {
        warn!(
            models = trials.models.len(),
            prompts = trials.prompts.len(),
            "Nothing to benchmark: configure at least one model and one prompt"
        );
        return Ok(());
    }

    info!(
        models = ?trials.models,
        prompts = trials.prompts.len(),
        readiness = ?readiness,
        "Benchmark configured"
    );
    match &output_csv {
        Some(path) => info!("Results file: {}", path.display()),
        None => info!("No results file configured"),
    }

    let runner = Arc::new(OllamaRunner::from_config(&config.ollama));
    let catalog = Arc::new(
        MusicBrainzCatalog::new(&config.catalog)
            .context("Failed to initialize MusicBrainz client")?,
    );

    let benchmark = Benchmark::new(trials, runner, catalog)
        .with_readiness_policy(readiness)
        .with_output_csv(output_csv);

    let report = benchmark
        .run()
        .await
        .context("Failed to write benchmark results")?;

    log_summary(&report);
    Ok(())
}

/// Initialize tracing from RUST_LOG, falling back to the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "plb_bench={level},plb_common={level}",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
