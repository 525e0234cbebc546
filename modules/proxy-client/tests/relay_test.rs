use std::collections::HashMap;

use axum::{
    extract::{Query, RawQuery},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;

use proxy_client::{ProxyClient, ProxyError};

const PAGE: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn relay() -> Router {
    Router::new()
        .route("/page", get(|| async { "<html><head><title>Mix</title></head></html>" }))
        .route("/blocked", get(|| async { (StatusCode::FORBIDDEN, "denied") }))
        .route("/blank", get(|| async { "   " }))
        .route(
            "/get",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "contents": format!("<html>{}</html>", params["url"]) }))
            }),
        )
        .route("/empty/get", get(|| async { Json(json!({ "contents": "  " })) }))
        .route("/null/get", get(|| async { Json(json!({ "contents": null })) }))
        .route(
            "/",
            get(|RawQuery(query): RawQuery| async move { query.unwrap_or_default() }),
        )
}

#[tokio::test]
async fn direct_returns_body_on_success() {
    let base = serve(relay()).await;
    let client = ProxyClient::new(http());
    let body = client.direct(&format!("{base}/page")).await.unwrap();
    assert!(body.contains("<title>Mix</title>"));
}

#[tokio::test]
async fn direct_non_success_is_api_error() {
    let base = serve(relay()).await;
    let client = ProxyClient::new(http());
    let err = client.direct(&format!("{base}/blocked")).await.unwrap_err();
    match err {
        ProxyError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "denied");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn direct_blank_body_is_empty() {
    let base = serve(relay()).await;
    let client = ProxyClient::new(http());
    let err = client.direct(&format!("{base}/blank")).await.unwrap_err();
    assert!(matches!(err, ProxyError::EmptyBody("direct")));
}

#[tokio::test]
async fn allorigins_unwraps_contents() {
    let base = serve(relay()).await;
    let client =
        ProxyClient::new(http()).with_allorigins_url(format!("{base}/get"));
    let body = client.allorigins(PAGE).await.unwrap();
    assert_eq!(body, format!("<html>{PAGE}</html>"));
}

#[tokio::test]
async fn allorigins_blank_or_null_contents_is_empty() {
    let base = serve(relay()).await;

    let client =
        ProxyClient::new(http()).with_allorigins_url(format!("{base}/empty/get"));
    let err = client.allorigins(PAGE).await.unwrap_err();
    assert!(matches!(err, ProxyError::EmptyBody("allorigins")));

    let client =
        ProxyClient::new(http()).with_allorigins_url(format!("{base}/null/get"));
    let err = client.allorigins(PAGE).await.unwrap_err();
    assert!(matches!(err, ProxyError::EmptyBody("allorigins")));
}

#[tokio::test]
async fn corsproxy_passes_encoded_target() {
    let base = serve(relay()).await;
    let client = ProxyClient::new(http()).with_corsproxy_url(format!("{base}/"));
    let body = client.corsproxy(PAGE).await.unwrap();
    assert_eq!(
        body,
        "https%3A%2F%2Fopen.spotify.com%2Fplaylist%2F37i9dQZF1DXcBWIGoYBM5M"
    );
}
