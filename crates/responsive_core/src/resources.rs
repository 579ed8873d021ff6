//! crates/responsive_core/src/resources.rs
//!
//! A static resource audit of a fetched page: what it references, how much is
//! inlined, and which counts are high enough to hurt mobile load times.

use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;

use crate::domain::{Finding, IssueCategory};

pub const MAX_HTML_BYTES: usize = 500 * 1024;
pub const MAX_SCRIPTS: usize = 15;
pub const MAX_STYLESHEETS: usize = 5;
pub const MAX_EAGER_IMAGES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCounts {
    pub scripts: usize,
    pub stylesheets: usize,
    pub images: usize,
    pub lazy_images: usize,
    pub iframes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAudit {
    pub html_bytes: usize,
    pub fetch_millis: u128,
    pub resources: ResourceCounts,
    pub inline_script_bytes: usize,
    pub inline_style_bytes: usize,
    pub findings: Vec<Finding>,
}

fn count(document: &Html, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|s| document.select(&s).count())
        .unwrap_or(0)
}

fn inline_bytes(document: &Html, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|s| {
            document
                .select(&s)
                .map(|el| el.text().map(str::len).sum::<usize>())
                .sum()
        })
        .unwrap_or(0)
}

pub fn audit_resources(html: &str, elapsed: Duration) -> ResourceAudit {
    let document = Html::parse_document(html);
    let resources = ResourceCounts {
        scripts: count(&document, "script[src]"),
        stylesheets: count(&document, "link[rel~=stylesheet]"),
        images: count(&document, "img"),
        lazy_images: count(&document, "img[loading=lazy]"),
        iframes: count(&document, "iframe"),
    };

    let mut findings = Vec::new();
    if html.len() > MAX_HTML_BYTES {
        findings.push(Finding::new(
            IssueCategory::Warning,
            "Large HTML document",
            format!(
                "The HTML is {} KB; documents over {} KB slow down first render on mobile networks.",
                html.len() / 1024,
                MAX_HTML_BYTES / 1024
            ),
        ));
    }
    if resources.scripts > MAX_SCRIPTS {
        findings.push(
            Finding::new(
                IssueCategory::Warning,
                "Many external scripts",
                format!(
                    "The page loads {} external scripts; consider bundling or deferring them.",
                    resources.scripts
                ),
            )
            .with_element("script"),
        );
    }
    if resources.stylesheets > MAX_STYLESHEETS {
        findings.push(
            Finding::new(
                IssueCategory::Warning,
                "Many render-blocking stylesheets",
                format!(
                    "The page links {} stylesheets, each of which blocks rendering.",
                    resources.stylesheets
                ),
            )
            .with_element("link"),
        );
    }
    let eager_images = resources.images - resources.lazy_images;
    if eager_images > MAX_EAGER_IMAGES {
        findings.push(
            Finding::new(
                IssueCategory::Warning,
                "Images not lazy-loaded",
                format!(
                    "{} images load eagerly; add loading=\"lazy\" to those below the fold.",
                    eager_images
                ),
            )
            .with_element("img"),
        );
    }
    if findings.is_empty() {
        findings.push(Finding::new(
            IssueCategory::Success,
            "No resource issues found",
            "Document size and resource counts are within the recommended limits.",
        ));
    }

    ResourceAudit {
        html_bytes: html.len(),
        fetch_millis: elapsed.as_millis(),
        resources,
        inline_script_bytes: inline_bytes(&document, "script:not([src])"),
        inline_style_bytes: inline_bytes(&document, "style"),
        findings,
    }
}
