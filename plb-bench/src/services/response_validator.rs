//! Response Validator
//!
//! Turns an untrusted model response into catalog-verified track counts.
//!
//! Structural problems are reported as data, never as errors:
//! - output that is not text → zero counts, `Bad model response`
//! - text that is not a JSON array → zero counts, `JSON ERROR` marker followed
//!   by the original text so the raw output stays inspectable
//! - array elements without a string title and artist → skipped, not counted
//!
//! Tracks are checked one at a time in list order; the transcript has one
//! line per checked track in that order.

use crate::models::{TrackCandidate, TrackEntry, ValidationOutcome};
use crate::types::{CatalogLookup, ModelResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Diagnostic for responses that are not text
pub const BAD_RESPONSE_MARKER: &str = "Bad model response";

/// Prefix of the diagnostic for responses that fail to parse
pub const JSON_ERROR_MARKER: &str = "JSON ERROR";

/// Parse a response as a JSON track list
///
/// Fails only when the text is not a JSON array. Elements that do not carry
/// both a string `title` and a string `artist` are dropped individually.
pub fn parse_track_candidates(text: &str) -> Result<Vec<TrackCandidate>, serde_json::Error> {
    let elements: Vec<serde_json::Value> = serde_json::from_str(text)?;

    Ok(elements
        .into_iter()
        .filter_map(|element| serde_json::from_value::<TrackEntry>(element).ok())
        .filter_map(TrackEntry::into_candidate)
        .collect())
}

/// Validates model responses against a music catalog
pub struct ResponseValidator {
    catalog: Arc<dyn CatalogLookup>,
}

impl ResponseValidator {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }

    /// Validate one response
    pub async fn validate(&self, response: &ModelResponse) -> ValidationOutcome {
        let text = match response.as_text() {
            Some(text) => text,
            None => {
                warn!("Model response is not valid UTF-8 text");
                return ValidationOutcome::diagnostic(BAD_RESPONSE_MARKER);
            }
        };

        let candidates = match parse_track_candidates(text) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Model response is not a JSON track list");
                return ValidationOutcome::diagnostic(format!("{} \n {}", JSON_ERROR_MARKER, text));
            }
        };

        let start = Instant::now();
        let mut outcome = ValidationOutcome::default();

        for candidate in &candidates {
            outcome.tracks_parsed += 1;

            let verdict = self.catalog.exists(&candidate.title, &candidate.artist).await;
            debug!(
                title = %candidate.title,
                artist = %candidate.artist,
                found = verdict.found,
                "Catalog check"
            );

            if verdict.found {
                outcome.tracks_found += 1;
            }
            outcome.check_results.push_str(&verdict.description);
            outcome.check_results.push('\n');
        }

        debug!(
            tracks = candidates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Validation complete"
        );

        outcome
    }
}
