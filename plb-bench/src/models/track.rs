//! Track list types extracted from model responses

use serde::Deserialize;

/// Shape of one element of a model's JSON track list
///
/// Both fields are optional so that a malformed element can be detected and
/// skipped without rejecting the rest of the list. Extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

impl TrackEntry {
    /// Convert to a candidate when both title and artist are present
    pub fn into_candidate(self) -> Option<TrackCandidate> {
        match (self.title, self.artist) {
            (Some(title), Some(artist)) => Some(TrackCandidate { title, artist }),
            _ => None,
        }
    }
}

/// A (title, artist) pair awaiting catalog verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    pub title: String,
    pub artist: String,
}

/// Result of validating one model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Tracks confirmed present in the catalog
    pub tracks_found: usize,
    /// Tracks carrying both a title and an artist
    pub tracks_parsed: usize,
    /// One catalog description per checked track, or a parse diagnostic
    pub check_results: String,
}

impl ValidationOutcome {
    /// Zero-count outcome carrying only a diagnostic
    pub fn diagnostic(check_results: impl Into<String>) -> Self {
        Self {
            tracks_found: 0,
            tracks_parsed: 0,
            check_results: check_results.into(),
        }
    }
}
