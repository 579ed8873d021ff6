//! services/api/src/adapters/static_renderer.rs
//!
//! A `PageRenderer` that loads pages through the proxy fetcher and measures
//! them from their declared styles instead of a layout engine.

use async_trait::async_trait;
use responsive_core::{
    ports::{PageFetcher, PageRenderer, PortError, PortResult},
    snapshot::snapshot_from_html,
    PageSnapshot, ScreenSize,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct StaticHtmlRenderer {
    fetcher: Arc<dyn PageFetcher>,
}

impl StaticHtmlRenderer {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PageRenderer for StaticHtmlRenderer {
    async fn render(&self, url: &str, viewport: ScreenSize) -> PortResult<PageSnapshot> {
        let page = self.fetcher.fetch(url).await?;
        if !page.is_html() {
            return Err(PortError::AccessDenied(format!(
                "{} returned {} instead of an HTML document",
                page.url,
                page.content_type.as_deref().unwrap_or("an unknown content type")
            )));
        }

        // `Html` is not Send, so the snapshot is built without crossing an await.
        let snapshot = snapshot_from_html(&page.body, viewport);
        debug!(
            "Rendered {} at {}: {} elements, scroll width {}",
            page.url,
            viewport,
            snapshot.elements.len(),
            snapshot.scroll_width
        );
        Ok(snapshot)
    }
}
