//! Benchmark data model

pub mod track;
pub mod trial;

pub use track::{TrackCandidate, TrackEntry, ValidationOutcome};
pub use trial::{ModelSummary, RunReport, TrialConfig, TrialResult, ERROR_OUTPUT_PREFIX};
