use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::api::query::{MovieFilter, by_filters, popular, search};
use crate::config::ApiTimeouts;

const GOOD_KEY: &str = "good-key";

// =========================================================================
// Fake upstream
// =========================================================================

type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn movie_list(
    State(seen): State<Seen>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    seen.lock()
        .unwrap()
        .push((uri.path().to_owned(), params.clone()));
    if params.get("api_key").map(String::as_str) != Some(GOOD_KEY) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let page: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    Ok(Json(json!({
        "page": page,
        "total_pages": 7,
        "results": [{
            "id": 496243,
            "title": "기생충",
            "poster_path": "/poster.jpg",
            "backdrop_path": null,
            "overview": "overview",
            "vote_average": 8.5,
            "release_date": "2019-05-30",
            "genre_ids": [35, 53, 18]
        }]
    })))
}

async fn genre_list(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    if params.get("api_key").map(String::as_str) != Some(GOOD_KEY) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({ "genres": [{ "id": 28, "name": "액션" }, { "id": 35, "name": "코미디" }] })))
}

async fn garbage() -> &'static str {
    "not json"
}

async fn spawn_upstream() -> (ApiClient, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/3/movie/popular", get(movie_list))
        .route("/3/discover/movie", get(movie_list))
        .route("/3/search/movie", get(movie_list))
        .route("/3/movie/upcoming", get(garbage))
        .route("/3/genre/movie/list", get(genre_list))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (client_for(&format!("http://{addr}/3/")), seen)
}

fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: base_url.to_owned(),
        language: "ko-KR".to_owned(),
        timeouts: ApiTimeouts { request_secs: 5, connect_secs: 2 },
    })
    .unwrap()
}

fn good() -> Credential {
    Credential::new(GOOD_KEY)
}

// =========================================================================
// base_params
// =========================================================================

#[test]
fn base_params_with_credential() {
    let client = client_for("http://localhost/3");
    let cred = good();
    assert_eq!(
        client.base_params(Some(&cred)),
        vec![("api_key", GOOD_KEY.to_owned()), ("language", "ko-KR".to_owned())]
    );
}

#[test]
fn base_params_without_credential_sends_language_only() {
    let client = client_for("http://localhost/3");
    assert_eq!(client.base_params(None), vec![("language", "ko-KR".to_owned())]);
}

#[test]
fn base_url_trailing_slash_trimmed() {
    assert_eq!(client_for("http://localhost/3/").base_url(), "http://localhost/3");
}

// =========================================================================
// movies
// =========================================================================

#[tokio::test]
async fn movies_merges_credential_language_and_filter_params() {
    let (client, seen) = spawn_upstream().await;
    let request = by_filters(&MovieFilter {
        genre_id: Some(28),
        min_rating: Some(7.0),
        year: Some("2020".to_owned()),
        ..MovieFilter::default()
    });

    let page = client.movies(&request, Some(&good())).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 7);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 496_243);
    assert_eq!(page.results[0].backdrop_path, None);
    assert_eq!(page.results[0].genre_ids, vec![35, 53, 18]);

    let seen = seen.lock().unwrap();
    let (path, params) = &seen[0];
    assert_eq!(path, "/3/discover/movie");
    assert_eq!(params["api_key"], GOOD_KEY);
    assert_eq!(params["language"], "ko-KR");
    assert_eq!(params["with_genres"], "28");
    assert_eq!(params["vote_average.gte"], "7");
    assert_eq!(params["primary_release_year"], "2020");
    assert_eq!(params["sort_by"], "popularity.desc");
    assert_eq!(params["region"], "KR");
}

#[tokio::test]
async fn movies_reports_requested_page() {
    let (client, _) = spawn_upstream().await;
    let page = client.movies(&search("parasite", 3), Some(&good())).await.unwrap();
    assert_eq!(page.page, 3);
}

#[tokio::test]
async fn movies_without_credential_degrade_to_empty_page() {
    let (client, seen) = spawn_upstream().await;
    let page = client.movies(&popular(2), None).await.unwrap();
    assert_eq!(page, MoviePage::empty(2));

    let seen = seen.lock().unwrap();
    assert!(!seen[0].1.contains_key("api_key"));
}

#[tokio::test]
async fn movies_with_rejected_credential_surface_status() {
    let (client, _) = spawn_upstream().await;
    let err = client
        .movies(&popular(1), Some(&Credential::new("bad")))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}

#[tokio::test]
async fn movies_undecodable_body_is_decode_error() {
    let (client, _) = spawn_upstream().await;
    let err = client
        .movies(&crate::api::query::upcoming(1), Some(&good()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn movies_unreachable_upstream_is_request_error() {
    let client = client_for("http://127.0.0.1:1/3");
    let err = client.movies(&popular(1), Some(&good())).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

// =========================================================================
// genres
// =========================================================================

#[tokio::test]
async fn genres_decodes_list() {
    let (client, _) = spawn_upstream().await;
    let genres = client.genres(Some(&good())).await.unwrap();
    assert_eq!(
        genres,
        vec![Genre { id: 28, name: "액션".to_owned() }, Genre { id: 35, name: "코미디".to_owned() }]
    );
}

// =========================================================================
// validate_credential
// =========================================================================

#[tokio::test]
async fn validate_credential_accepts_good_key() {
    let (client, seen) = spawn_upstream().await;
    assert!(client.validate_credential(GOOD_KEY).await);

    let seen = seen.lock().unwrap();
    let (path, params) = &seen[0];
    assert_eq!(path, "/3/movie/popular");
    assert_eq!(params.len(), 2);
    assert_eq!(params["language"], "ko-KR");
}

#[tokio::test]
async fn validate_credential_rejects_bad_key() {
    let (client, _) = spawn_upstream().await;
    assert!(!client.validate_credential("nope").await);
}

#[tokio::test]
async fn validate_credential_swallows_transport_errors() {
    let client = client_for("http://127.0.0.1:1/3");
    assert!(!client.validate_credential(GOOD_KEY).await);
}

#[test]
fn credential_debug_is_redacted() {
    assert_eq!(format!("{:?}", good()), "Credential(***)");
}
