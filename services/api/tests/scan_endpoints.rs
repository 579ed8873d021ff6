mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{post_json, send, FakeCompletion, FakeRenderer, TestAppBuilder};
use responsive_core::{
    ports::PortError,
    scanner::{Bounds, ElementMetrics},
    PageSnapshot,
};
use serde_json::json;
use std::time::Duration;

fn clean_snapshot() -> PageSnapshot {
    let mut text = ElementMetrics::new("p");
    text.font_size = Some(16.0);
    let mut image = ElementMetrics::new("img");
    image.max_width = Some("100%".into());
    PageSnapshot {
        has_viewport_meta: true,
        scroll_width: 390,
        elements: vec![text, image],
    }
}

fn scan_body() -> serde_json::Value {
    json!({ "url": "https://example.com", "viewport": { "width": 390, "height": 844 } })
}

#[tokio::test]
async fn clean_page_yields_single_success() {
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::returning(clean_snapshot()))
        .build();

    let (status, body) = post_json(&app, "/api/scan", scan_body()).await;
    assert_eq!(status, StatusCode::OK);
    let findings = body["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["category"], "success");
    assert!(body.get("analysis").is_none());
}

#[tokio::test]
async fn wide_page_overflows_and_reports_in_rule_order() {
    let mut snapshot = clean_snapshot();
    snapshot.has_viewport_meta = false;
    snapshot.scroll_width = 500;
    let mut button = ElementMetrics::new("button");
    button.bounds = Some(Bounds {
        width: 30.0,
        height: 30.0,
    });
    snapshot.elements.push(button);

    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::returning(snapshot))
        .build();
    let (status, body) = post_json(&app, "/api/scan", scan_body()).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body["findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Missing viewport meta tag", "Touch targets too small", "Horizontal overflow"]
    );
}

#[tokio::test]
async fn client_snapshot_skips_rendering() {
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::failing(PortError::UpstreamFailure(
            "should not be called".into(),
        )))
        .build();
    let mut body = scan_body();
    body["snapshot"] = json!({ "hasViewportMeta": true, "scrollWidth": 390, "elements": [] });

    let (status, body) = post_json(&app, "/api/scan", body).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["findings"][0]["category"], "success");
}

#[tokio::test]
async fn slow_page_times_out() {
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::slow(Duration::from_secs(5)))
        .scan_timeout(Duration::from_millis(50))
        .build();

    let (status, body) = post_json(&app, "/api/scan", scan_body()).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["kind"], "timeout");
}

#[tokio::test]
async fn refused_document_is_a_terminal_error() {
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::failing(PortError::AccessDenied(
            "https://example.com responded with 403 Forbidden".into(),
        )))
        .build();

    let (status, body) = post_json(&app, "/api/scan", scan_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "access-denied");
    assert!(body.get("findings").is_none());
}

#[tokio::test]
async fn analysis_failure_does_not_hide_findings() {
    let mut snapshot = clean_snapshot();
    snapshot.scroll_width = 800;
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::returning(snapshot.clone()))
        .build();
    let mut body = scan_body();
    body["withAnalysis"] = json!(true);

    let (status, response) = post_json(&app, "/api/scan", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["findings"][0]["title"], "Horizontal overflow");
    assert!(response.get("analysis").is_none());
    assert!(response["analysisError"]
        .as_str()
        .unwrap()
        .contains("OPENAI_API_KEY"));

    let completion = FakeCompletion::replying("Constrain the wide container.");
    let app = TestAppBuilder::new()
        .renderer(FakeRenderer::returning(snapshot))
        .completion(completion.clone())
        .build();
    let (status, response) = post_json(&app, "/api/scan", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["analysis"], "Constrain the wide container.");
    assert!(completion.last_prompt().unwrap().contains("phone"));
}

#[tokio::test]
async fn invalid_scan_input_is_rejected() {
    let app = TestAppBuilder::new().build();

    let (status, body) = post_json(
        &app,
        "/api/scan",
        json!({ "url": "ftp://example.com", "viewport": { "width": 390, "height": 844 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "url");

    let (status, body) = post_json(
        &app,
        "/api/scan",
        json!({ "url": "https://example.com", "viewport": { "width": 0, "height": 844 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "viewport");

    let request = Request::builder()
        .method("POST")
        .uri("/api/scan")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "validation");
}
