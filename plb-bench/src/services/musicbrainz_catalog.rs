//! MusicBrainz catalog lookup
//!
//! Verifies model-generated tracks by searching MusicBrainz recordings for the
//! title and artist, then fuzzy-matching the returned candidates.
//!
//! # API Reference
//! - Endpoint: https://musicbrainz.org/ws/2/recording?query=...&fmt=json
//! - Documentation: https://musicbrainz.org/doc/MusicBrainz_API/Search
//! - Rate Limit: 1 request/second (as per MusicBrainz Terms of Service)

use crate::types::{CatalogLookup, CatalogVerdict};
use async_trait::async_trait;
use plb_common::config::CatalogConfig;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default timeout for MusicBrainz API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Characters with special meaning in Lucene query syntax
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// MusicBrainz catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Recording search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordingSearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub recordings: Vec<SearchRecording>,
}

/// One recording returned by a search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecording {
    /// Recording MBID
    pub id: String,
    pub title: String,
    /// Search relevance (0-100)
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// Artist credit on a recording
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    /// Credited name
    pub name: String,
}

/// Best candidate for a queried track
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMatch {
    pub mbid: String,
    pub title: String,
    pub artist: String,
    /// Mean of title and artist similarity (0.0-1.0)
    pub score: f64,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("MusicBrainz rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// MusicBrainz-backed catalog
pub struct MusicBrainzCatalog {
    http_client: reqwest::Client,
    base_url: String,
    search_limit: u32,
    match_threshold: f64,
    rate_limiter: RateLimiter,
}

impl MusicBrainzCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_limit: config.search_limit,
            match_threshold: config.match_threshold,
            rate_limiter: RateLimiter::new(config.rate_limit_ms),
        })
    }

    /// Search recordings by title and artist
    pub async fn search_recordings(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<RecordingSearchResponse, CatalogError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/recording", self.base_url);
        let query = build_query(title, artist);
        let limit = self.search_limit.to_string();

        debug!(url = %url, query = %query, "Querying MusicBrainz recording search");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query.as_str()),
                ("limit", limit.as_str()),
                ("fmt", "json"),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 503 {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Pick the best recording whose title and artist both clear the threshold
    pub fn best_match(
        &self,
        title: &str,
        artist: &str,
        recordings: &[SearchRecording],
    ) -> Option<RecordingMatch> {
        recordings
            .iter()
            .filter_map(|rec| {
                let title_sim = fuzzy_similarity(title, &rec.title);
                let (credited, artist_sim) = rec
                    .artist_credit
                    .iter()
                    .map(|credit| (credit.name.as_str(), fuzzy_similarity(artist, &credit.name)))
                    .max_by(|a, b| a.1.total_cmp(&b.1))?;

                if title_sim < self.match_threshold || artist_sim < self.match_threshold {
                    return None;
                }

                Some(RecordingMatch {
                    mbid: rec.id.clone(),
                    title: rec.title.clone(),
                    artist: credited.to_string(),
                    score: (title_sim + artist_sim) / 2.0,
                })
            })
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[async_trait]
impl CatalogLookup for MusicBrainzCatalog {
    async fn exists(&self, title: &str, artist: &str) -> CatalogVerdict {
        let response = match self.search_recordings(title, artist).await {
            Ok(response) => response,
            Err(e) => {
                warn!(title = %title, artist = %artist, error = %e, "MusicBrainz lookup failed");
                return CatalogVerdict::not_found(format!(
                    "Lookup failed: \"{}\" by {} ({})",
                    title, artist, e
                ));
            }
        };

        debug!(
            title = %title,
            artist = %artist,
            candidates = response.recordings.len(),
            total = response.count,
            "MusicBrainz search complete"
        );

        match self.best_match(title, artist, &response.recordings) {
            Some(m) => CatalogVerdict::found(format!(
                "Found: \"{}\" by {} -> \"{}\" by {} (mbid {})",
                title, artist, m.title, m.artist, m.mbid
            )),
            None => CatalogVerdict::not_found(format!("Not found: \"{}\" by {}", title, artist)),
        }
    }
}

/// Build a Lucene recording query for title and artist
pub fn build_query(title: &str, artist: &str) -> String {
    format!(
        "recording:\"{}\" AND artist:\"{}\"",
        escape_lucene(title.trim()),
        escape_lucene(artist.trim())
    )
}

fn escape_lucene(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if LUCENE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Jaro-Winkler similarity of normalized (lowercased, trimmed) strings
fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    let a_normalized = a.trim().to_lowercase();
    let b_normalized = b.trim().to_lowercase();
    strsim::jaro_winkler(&a_normalized, &b_normalized)
}
