mod common;

use api_lib::adapters::ReqwestPageFetcher;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{get_json, post_json, send, TestAppBuilder};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn proxied_app() -> common::TestApp {
    TestAppBuilder::new()
        .fetcher(Arc::new(ReqwestPageFetcher::with_client(reqwest::Client::new())))
        .build()
}

fn wordpress_request(uri: &str, key: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("X-WP-API-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn fetch_page_returns_raw_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>hello</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let app = proxied_app();
    let request = Request::builder()
        .uri(format!("/api/fetch-page?url={}/landing", server.uri()))
        .body(Body::empty())
        .unwrap();
    let (status, content_type, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert_eq!(bytes, b"<html><body>hello</body></html>");
}

#[tokio::test]
async fn fetch_page_reports_upstream_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let app = proxied_app();
    let (status, body) = get_json(&app, &format!("/api/fetch-page?url={}/down", server.uri())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "upstream-failure");
    assert!(body["message"].as_str().unwrap().contains("502"));

    let (status, body) = get_json(&app, "/api/fetch-page").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "url");
}

#[tokio::test]
async fn apply_css_forwards_key_to_plugin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/responsive-tester/v1/css"))
        .and(header("X-API-Key", "wp-key"))
        .and(body_json(json!({ "css": "nav { display: block; }", "description": "Stack nav" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "changeId": "c-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestAppBuilder::new().build();
    let request = wordpress_request(
        "/api/wordpress/apply-css",
        Some("wp-key"),
        json!({ "siteUrl": server.uri(), "css": "nav { display: block; }", "description": "Stack nav" }),
    );
    let (status, _, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["changeId"], "c-1");
}

#[tokio::test]
async fn wordpress_routes_require_a_key() {
    let app = TestAppBuilder::new().build();
    let request = wordpress_request(
        "/api/wordpress/apply-css",
        None,
        json!({ "siteUrl": "https://example.com", "css": "a { }" }),
    );
    let (status, _, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn revert_maps_rejected_key_to_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/responsive-tester/v1/css/c-1/revert"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let app = TestAppBuilder::new().build();
    let request = wordpress_request(
        "/api/wordpress/revert-css/c-1",
        Some("stale-key"),
        json!({ "siteUrl": server.uri() }),
    );
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post_json(
        &app,
        "/api/wordpress/revert-css/c-1",
        json!({ "siteUrl": server.uri() }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}
