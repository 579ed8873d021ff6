//! Shared fakes and request helpers for the router tests.
#![allow(dead_code)]

use api_lib::{
    adapters::{InMemoryDeviceCatalog, InMemoryProgressStore, ReqwestWordPressGateway},
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use responsive_core::{
    ports::{
        CompletionService, FetchedPage, PageFetcher, PageRenderer, PortError, PortResult,
    },
    PageSnapshot, ScreenSize,
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tower::ServiceExt;

//=========================================================================================
// Fake Ports
//=========================================================================================

/// Answers every render with the same snapshot, optionally after a delay.
pub struct FakeRenderer {
    pub result: PortResult<PageSnapshot>,
    pub delay: Duration,
}

impl FakeRenderer {
    pub fn returning(snapshot: PageSnapshot) -> Self {
        Self {
            result: Ok(snapshot),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            result: Ok(PageSnapshot::default()),
            delay,
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, _url: &str, _viewport: ScreenSize) -> PortResult<PageSnapshot> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Serves one canned HTML body for any URL.
pub struct FakeFetcher {
    pub body: String,
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> PortResult<FetchedPage> {
        Ok(FetchedPage {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: self.body.clone(),
            elapsed: Duration::from_millis(12),
        })
    }
}

/// Replies with a canned completion and records every prompt it receives.
pub struct FakeCompletion {
    reply: PortResult<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: PortError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn answer(&self, user: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        self.reply.clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete_text(&self, _system: &str, user: &str) -> PortResult<String> {
        self.answer(user)
    }

    async fn complete_json(&self, _system: &str, user: &str) -> PortResult<String> {
        self.answer(user)
    }
}

//=========================================================================================
// App Construction
//=========================================================================================

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

pub struct TestAppBuilder {
    config: Config,
    renderer: Arc<dyn PageRenderer>,
    fetcher: Arc<dyn PageFetcher>,
    completion: Option<Arc<FakeCompletion>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            renderer: Arc::new(FakeRenderer::returning(PageSnapshot::default())),
            fetcher: Arc::new(FakeFetcher {
                body: "<html><body></body></html>".to_string(),
            }),
            completion: None,
        }
    }

    pub fn renderer(mut self, renderer: FakeRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn page(self, body: &str) -> Self {
        self.fetcher(Arc::new(FakeFetcher {
            body: body.to_string(),
        }))
    }

    pub fn completion(mut self, completion: Arc<FakeCompletion>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.config.scan_timeout = timeout;
        self
    }

    pub fn build(self) -> TestApp {
        let completion = self
            .completion
            .map(|c| c as Arc<dyn CompletionService>);
        let state = Arc::new(AppState {
            config: Arc::new(self.config),
            fetcher: self.fetcher,
            renderer: self.renderer,
            completion: completion.clone(),
            fix_completion: completion,
            devices: Arc::new(InMemoryDeviceCatalog::seeded()),
            progress: Arc::new(InMemoryProgressStore::new()),
            wordpress: Arc::new(ReqwestWordPressGateway::new(reqwest::Client::new())),
        });
        let router = router(state.clone()).expect("router builds");
        TestApp { state, router }
    }
}

//=========================================================================================
// Request Helpers
//=========================================================================================

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, String, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap()
    }
}

pub async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, bytes) = send(app, request).await;
    (status, json_of(&bytes))
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, bytes) = send(app, request).await;
    (status, json_of(&bytes))
}
