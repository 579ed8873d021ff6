//! crates/responsive_core/src/scanner.rs
//!
//! The heuristic page scanner. Given a snapshot of a rendered page and the target
//! viewport, it applies five fixed rules and returns the union of what fired.

use serde::{Deserialize, Serialize};

use crate::domain::{Finding, IssueCategory, ScreenSize};

/// Text smaller than this (in CSS px) is flagged as hard to read.
pub const MIN_FONT_SIZE_PX: f64 = 12.0;

/// Clickable elements narrower or shorter than this (in CSS px) are flagged.
pub const MIN_TOUCH_TARGET_PX: f64 = 44.0;

//=========================================================================================
// Snapshot Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Measured facts about one element of the rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMetrics {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Computed font size, present only for elements that render text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
}

impl ElementMetrics {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn is_clickable(&self) -> bool {
        let tag = self.tag.to_ascii_lowercase();
        tag == "button"
            || tag == "a"
            || self
                .role
                .as_deref()
                .is_some_and(|role| role.trim().eq_ignore_ascii_case("button"))
    }

    pub fn is_image(&self) -> bool {
        self.tag.eq_ignore_ascii_case("img")
    }

    /// An image counts as responsive when it declares a `srcset` or caps its width.
    pub fn has_responsive_hint(&self) -> bool {
        let has_srcset = self.srcset.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_max_width = self
            .max_width
            .as_deref()
            .map(str::trim)
            .is_some_and(|mw| !mw.is_empty() && !mw.eq_ignore_ascii_case("none"));
        has_srcset || has_max_width
    }
}

/// Everything the scanner needs to know about a loaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub has_viewport_meta: bool,
    pub scroll_width: u32,
    #[serde(default)]
    pub elements: Vec<ElementMetrics>,
}

//=========================================================================================
// Rules
//=========================================================================================

/// The fixed checklist, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ViewportMeta,
    FontSize,
    TouchTargets,
    HorizontalOverflow,
    ResponsiveImages,
}

impl Rule {
    pub const ALL: [Rule; 5] = [
        Rule::ViewportMeta,
        Rule::FontSize,
        Rule::TouchTargets,
        Rule::HorizontalOverflow,
        Rule::ResponsiveImages,
    ];

    /// Evaluates this rule alone. Returns `None` when the rule does not fire.
    pub fn check(&self, snapshot: &PageSnapshot, viewport: ScreenSize) -> Option<Finding> {
        match self {
            Rule::ViewportMeta => check_viewport_meta(snapshot),
            Rule::FontSize => check_font_sizes(snapshot),
            Rule::TouchTargets => check_touch_targets(snapshot),
            Rule::HorizontalOverflow => check_overflow(snapshot, viewport),
            Rule::ResponsiveImages => check_images(snapshot),
        }
    }
}

/// Runs every rule against the snapshot.
///
/// The result is the union of all fired rules in checklist order. When nothing
/// fires, a single success finding is returned instead.
pub fn scan(snapshot: &PageSnapshot, viewport: ScreenSize) -> Vec<Finding> {
    let findings: Vec<Finding> = Rule::ALL
        .iter()
        .filter_map(|rule| rule.check(snapshot, viewport))
        .collect();

    if findings.is_empty() {
        return vec![Finding::new(
            IssueCategory::Success,
            "No responsive issues found",
            format!(
                "The page passed all checks at {}.",
                viewport
            ),
        )];
    }
    findings
}

fn check_viewport_meta(snapshot: &PageSnapshot) -> Option<Finding> {
    if snapshot.has_viewport_meta {
        return None;
    }
    Some(
        Finding::new(
            IssueCategory::Error,
            "Missing viewport meta tag",
            "The page has no <meta name=\"viewport\"> tag, so mobile browsers will render it at desktop width and scale it down.",
        )
        .with_element("meta"),
    )
}

fn check_font_sizes(snapshot: &PageSnapshot) -> Option<Finding> {
    let small: Vec<&ElementMetrics> = snapshot
        .elements
        .iter()
        .filter(|el| el.font_size.is_some_and(|size| size < MIN_FONT_SIZE_PX))
        .collect();
    let first = small.first()?;
    Some(
        Finding::new(
            IssueCategory::Warning,
            "Small text detected",
            format!(
                "{} element(s) use a font size below {}px, starting with <{}>.",
                small.len(),
                MIN_FONT_SIZE_PX,
                first.tag
            ),
        )
        .with_element(first.tag.clone()),
    )
}

fn check_touch_targets(snapshot: &PageSnapshot) -> Option<Finding> {
    let small: Vec<&ElementMetrics> = snapshot
        .elements
        .iter()
        .filter(|el| el.is_clickable())
        .filter(|el| {
            el.bounds.is_some_and(|b| {
                b.width < MIN_TOUCH_TARGET_PX || b.height < MIN_TOUCH_TARGET_PX
            })
        })
        .collect();
    let first = small.first()?;
    Some(
        Finding::new(
            IssueCategory::Warning,
            "Touch targets too small",
            format!(
                "{} clickable element(s) are smaller than {}x{}px, starting with <{}>.",
                small.len(),
                MIN_TOUCH_TARGET_PX,
                MIN_TOUCH_TARGET_PX,
                first.tag
            ),
        )
        .with_element(first.tag.clone()),
    )
}

fn check_overflow(snapshot: &PageSnapshot, viewport: ScreenSize) -> Option<Finding> {
    if snapshot.scroll_width <= viewport.width {
        return None;
    }
    Some(Finding::new(
        IssueCategory::Error,
        "Horizontal overflow",
        format!(
            "The content is {}px wide but the viewport is only {}px, causing horizontal scrolling.",
            snapshot.scroll_width, viewport.width
        ),
    ))
}

fn check_images(snapshot: &PageSnapshot) -> Option<Finding> {
    let count = snapshot
        .elements
        .iter()
        .filter(|el| el.is_image() && !el.has_responsive_hint())
        .count();
    if count == 0 {
        return None;
    }
    Some(
        Finding::new(
            IssueCategory::Warning,
            "Images are not responsive",
            format!(
                "{} image(s) have neither a srcset nor a max-width, so they may overflow small screens.",
                count
            ),
        )
        .with_element("img"),
    )
}
