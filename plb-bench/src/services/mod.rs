//! Benchmark services
//!
//! - `ollama_runner`: model invocation through the Ollama CLI
//! - `musicbrainz_catalog`: track existence checks against MusicBrainz
//! - `response_validator`: parsing and verification of model output

pub mod musicbrainz_catalog;
pub mod ollama_runner;
pub mod response_validator;

pub use musicbrainz_catalog::{CatalogError, MusicBrainzCatalog};
pub use ollama_runner::OllamaRunner;
pub use response_validator::{ResponseValidator, BAD_RESPONSE_MARKER, JSON_ERROR_MARKER};
