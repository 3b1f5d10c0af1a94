//! MusicBrainz Catalog HTTP Tests
//!
//! Runs the catalog client against a local axum server serving canned
//! recording-search responses.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use plb_bench::services::{CatalogError, MusicBrainzCatalog};
use plb_bench::CatalogLookup;
use plb_common::config::CatalogConfig;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What the fake search endpoint answers
#[derive(Clone)]
enum Canned {
    Recordings(serde_json::Value),
    Status(StatusCode),
}

#[derive(Clone)]
struct FakeState {
    canned: Canned,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn search(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.queries.lock().unwrap().push(params);
    match state.canned {
        Canned::Recordings(body) => Json(body).into_response(),
        Canned::Status(status) => (status, "unavailable").into_response(),
    }
}

/// Start the fake server; returns its base URL and the recorded query strings
async fn start_server(canned: Canned) -> (String, Arc<Mutex<Vec<HashMap<String, String>>>>) {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        canned,
        queries: queries.clone(),
    };
    let app = Router::new()
        .route("/ws/2/recording", get(search))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/ws/2/", addr), queries)
}

fn catalog(base_url: String) -> MusicBrainzCatalog {
    let config = CatalogConfig {
        base_url,
        rate_limit_ms: 0,
        ..CatalogConfig::default()
    };
    MusicBrainzCatalog::new(&config).unwrap()
}

fn let_it_be() -> serde_json::Value {
    json!({
        "created": "2024-01-01T00:00:00.000Z",
        "count": 2,
        "offset": 0,
        "recordings": [
            {
                "id": "rec-cover",
                "score": 90,
                "title": "Let It Be",
                "artist-credit": [{ "name": "Joan Baez", "artist": { "id": "a1" } }]
            },
            {
                "id": "rec-original",
                "score": 100,
                "title": "Let It Be",
                "length": 243000,
                "artist-credit": [{ "name": "The Beatles", "artist": { "id": "a2" } }]
            }
        ]
    })
}

#[tokio::test]
async fn test_found_recording() {
    let (base_url, queries) = start_server(Canned::Recordings(let_it_be())).await;
    let catalog = catalog(base_url);

    let verdict = catalog.exists("Let It Be", "The Beatles").await;

    assert!(verdict.found);
    assert_eq!(
        verdict.description,
        "Found: \"Let It Be\" by The Beatles -> \"Let It Be\" by The Beatles (mbid rec-original)"
    );

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].get("query").map(String::as_str),
        Some("recording:\"Let It Be\" AND artist:\"The Beatles\"")
    );
    assert_eq!(queries[0].get("fmt").map(String::as_str), Some("json"));
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn test_no_matching_recording() {
    let (base_url, _queries) = start_server(Canned::Recordings(let_it_be())).await;
    let catalog = catalog(base_url);

    let verdict = catalog.exists("Imaginary Song", "Nobody").await;

    assert!(!verdict.found);
    assert_eq!(verdict.description, "Not found: \"Imaginary Song\" by Nobody");
}

#[tokio::test]
async fn test_empty_search_result() {
    let body = json!({ "count": 0, "offset": 0, "recordings": [] });
    let (base_url, _queries) = start_server(Canned::Recordings(body)).await;

    let verdict = catalog(base_url).exists("Let It Be", "The Beatles").await;
    assert!(!verdict.found);
}

#[tokio::test]
async fn test_server_error_is_not_found() {
    let (base_url, _queries) =
        start_server(Canned::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;

    let verdict = catalog(base_url).exists("Let It Be", "The Beatles").await;

    assert!(!verdict.found);
    assert!(verdict
        .description
        .starts_with("Lookup failed: \"Let It Be\" by The Beatles"));
    assert!(verdict.description.contains("500"));
}

#[tokio::test]
async fn test_service_unavailable_is_rate_limited() {
    let (base_url, _queries) =
        start_server(Canned::Status(StatusCode::SERVICE_UNAVAILABLE)).await;

    let result = catalog(base_url)
        .search_recordings("Let It Be", "The Beatles")
        .await;

    assert!(matches!(result, Err(CatalogError::RateLimited)));
}

#[tokio::test]
async fn test_unreachable_server_is_not_found() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verdict = catalog(format!("http://{}/ws/2", addr))
        .exists("Let It Be", "The Beatles")
        .await;

    assert!(!verdict.found);
    assert!(verdict.description.starts_with("Lookup failed"));
}
