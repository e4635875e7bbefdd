use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bridge_ingest::{FetchError, HttpFetcherConfig, HttpReadingFetcher, ReadingFetcher};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

async fn last_feed(
    Path(channel_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("api_key").map(String::as_str) != Some("KEY1") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match channel_id.as_str() {
        "100" => Json(json!({
            "created_at": "2024-06-01T12:00:00Z",
            "entry_id": 42,
            "field6": "1.5",
            "field7": "26.3",
            "field8": null
        }))
        .into_response(),
        "200" => Json(json!(-1)).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn fetcher(base_url: String) -> HttpReadingFetcher {
    HttpReadingFetcher::new(HttpFetcherConfig {
        base_url,
        timeout: Some(Duration::from_secs(5)),
    })
    .expect("client")
}

fn app() -> Router {
    Router::new().route("/channels/:channel_id/feeds/last.json", get(last_feed))
}

#[tokio::test]
async fn fetch_last_parses_reading() {
    let base_url = spawn_server(app()).await;
    let reading = fetcher(base_url)
        .fetch_last("100", "KEY1")
        .await
        .expect("reading");
    assert_eq!(reading.entry_id, 42);
    assert_eq!(reading.created_at, "2024-06-01T12:00:00Z");
    assert_eq!(reading.field("field6"), Some("1.5"));
    assert_eq!(reading.field("field7"), Some("26.3"));
    assert_eq!(reading.fields.get("field8"), Some(&None));
}

#[tokio::test]
async fn non_success_status_is_fetch_failure() {
    let base_url = spawn_server(app()).await;
    let fetcher = fetcher(base_url);

    let err = fetcher.fetch_last("100", "WRONG").await.expect_err("401");
    assert!(matches!(err, FetchError::Status(401)));

    let err = fetcher.fetch_last("999", "KEY1").await.expect_err("404");
    assert_eq!(err.to_string(), "fetch failed with status 404");
}

#[tokio::test]
async fn empty_channel_body_is_decode_failure() {
    let base_url = spawn_server(app()).await;
    let err = fetcher(base_url)
        .fetch_last("200", "KEY1")
        .await
        .expect_err("decode");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = fetcher(format!("http://{}", addr))
        .fetch_last("100", "KEY1")
        .await
        .expect_err("transport");
    assert!(matches!(err, FetchError::Transport(_)));
}
