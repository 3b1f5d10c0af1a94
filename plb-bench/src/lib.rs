//! plb-bench library interface
//!
//! Benchmarks language models on playlist generation: every configured model
//! answers every configured prompt with a JSON track list, each answer is
//! timed, and every listed track is checked against a music catalog.

pub mod benchmark;
pub mod models;
pub mod report;
pub mod services;
pub mod types;

pub use crate::benchmark::Benchmark;
pub use crate::models::{RunReport, TrialConfig, TrialResult};
pub use crate::types::{CatalogLookup, CatalogVerdict, ModelResponse, ModelRunner, RunnerError};
