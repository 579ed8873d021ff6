//! crates/responsive_core/src/snapshot.rs
//!
//! Builds a [`PageSnapshot`] from raw HTML without a layout engine. Only declared
//! sizes are known, so the snapshot is an approximation of what a browser would
//! measure: undeclared bounds stay unknown rather than guessed.

use scraper::{ElementRef, Html, Selector};

use crate::css::{parse_length_px, StyleIndex};
use crate::domain::ScreenSize;
use crate::scanner::{Bounds, ElementMetrics, PageSnapshot};

/// Elements that never render content of their own.
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template", "link", "meta", "br"];

/// Returns true when the document declares `<meta name="viewport">`.
pub fn has_viewport_meta(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[name]") else {
        return false;
    };
    document.select(&selector).any(|meta| {
        meta.value()
            .attr("name")
            .is_some_and(|name| name.trim().eq_ignore_ascii_case("viewport"))
    })
}

/// Parses `html` and measures it for the given viewport.
pub fn snapshot_from_html(html: &str, viewport: ScreenSize) -> PageSnapshot {
    let document = Html::parse_document(html);
    snapshot_from_document(&document, viewport)
}

pub fn snapshot_from_document(document: &Html, viewport: ScreenSize) -> PageSnapshot {
    let styles = StyleIndex::build(document);
    let mut elements = Vec::new();
    let mut widest: f64 = 0.0;

    if let Ok(body_selector) = Selector::parse("body *") {
        for element in document.select(&body_selector) {
            let tag = element.value().name().to_ascii_lowercase();
            if NON_RENDERED.contains(&tag.as_str()) {
                continue;
            }
            let em_px = styles.font_size_px(&element, viewport.width);
            let font_size = has_own_text(&element).then_some(em_px);

            let width = declared_dimension(&styles, &element, "width", em_px, viewport);
            let height = declared_dimension(&styles, &element, "height", em_px, viewport);
            let min_width = styles
                .get(&element, "min-width")
                .and_then(|v| parse_length_px(v, f64::from(viewport.width), em_px, viewport.width));
            for w in [width, min_width].into_iter().flatten() {
                widest = widest.max(w);
            }

            let bounds = match (width, height) {
                (Some(width), Some(height)) => Some(Bounds { width, height }),
                _ => None,
            };

            elements.push(ElementMetrics {
                tag,
                role: element.value().attr("role").map(str::to_string),
                font_size,
                bounds,
                srcset: element.value().attr("srcset").map(str::to_string),
                max_width: styles.get(&element, "max-width").map(str::to_string),
            });
        }
    }

    PageSnapshot {
        has_viewport_meta: has_viewport_meta(document),
        scroll_width: viewport.width.max(widest.ceil() as u32),
        elements,
    }
}

/// Declared size in px from the style, falling back to the HTML attribute
/// (`<img width="600">`). Percentages resolve against the matching viewport
/// axis, `em` against the element's own font size.
fn declared_dimension(
    styles: &StyleIndex,
    element: &ElementRef<'_>,
    property: &str,
    em_px: f64,
    viewport: ScreenSize,
) -> Option<f64> {
    let percent_of = if property == "width" {
        f64::from(viewport.width)
    } else {
        f64::from(viewport.height)
    };
    let resolve = |v: &str| parse_length_px(v, percent_of, em_px, viewport.width);
    styles
        .get(element, property)
        .and_then(resolve)
        .or_else(|| element.value().attr(property).and_then(resolve))
}

fn has_own_text(element: &ElementRef<'_>) -> bool {
    element
        .children()
        .any(|child| child.value().as_text().is_some_and(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueCategory;
    use crate::scanner::scan;

    const PHONE: ScreenSize = ScreenSize::new(390, 844);

    #[test]
    fn detects_viewport_meta_case_insensitively() {
        let with = snapshot_from_html(
            r#"<html><head><meta name="Viewport" content="width=device-width"></head><body></body></html>"#,
            PHONE,
        );
        assert!(with.has_viewport_meta);

        let without = snapshot_from_html("<html><head></head><body><p>Hi</p></body></html>", PHONE);
        assert!(!without.has_viewport_meta);
    }

    #[test]
    fn wide_element_pushes_scroll_width_past_viewport() {
        let snapshot = snapshot_from_html(
            r#"<html><body><div style="width: 500px">wide</div></body></html>"#,
            PHONE,
        );
        assert_eq!(snapshot.scroll_width, 500);

        let narrow = snapshot_from_html(r#"<html><body><div style="width: 100%">ok</div></body></html>"#, PHONE);
        assert_eq!(narrow.scroll_width, 390);
    }

    #[test]
    fn font_sizes_only_for_text_bearing_elements() {
        let snapshot = snapshot_from_html(
            r#"<html><head><style>.fine { font-size: 10px }</style></head>
            <body><div><p class="fine">Small print</p></div><p>Normal</p></body></html>"#,
            PHONE,
        );
        let sizes: Vec<(String, Option<f64>)> = snapshot
            .elements
            .iter()
            .map(|e| (e.tag.clone(), e.font_size))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("div".to_string(), None),
                ("p".to_string(), Some(10.0)),
                ("p".to_string(), Some(16.0)),
            ]
        );
    }

    #[test]
    fn em_sized_boxes_resolve_against_font_size() {
        let html = r#"<html><head><meta name="viewport" content="width=device-width"></head>
            <body>
              <div style="width: 20em">fits</div>
              <button style="font-size: 12px; width: 2em; height: 2em">x</button>
            </body></html>"#;
        let snapshot = snapshot_from_html(html, PHONE);
        assert_eq!(snapshot.scroll_width, 390);

        let button = snapshot.elements.iter().find(|e| e.tag == "button").unwrap();
        let bounds = button.bounds.as_ref().unwrap();
        assert_eq!((bounds.width, bounds.height), (24.0, 24.0));

        let titles: Vec<String> = scan(&snapshot, PHONE).into_iter().map(|f| f.title).collect();
        assert_eq!(titles, vec!["Touch targets too small".to_string()]);
    }

    #[test]
    fn viewport_relative_font_size_is_not_small_text() {
        let html = r#"<html><head><meta name="viewport" content="width=device-width"></head>
            <body><p style="font-size: 5vw">Scales with the screen</p></body></html>"#;
        let snapshot = snapshot_from_html(html, PHONE);
        assert_eq!(snapshot.elements[0].font_size, Some(19.5));

        let findings = scan(&snapshot, PHONE);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, IssueCategory::Success);
    }

    #[test]
    fn static_page_runs_through_the_scanner() {
        let html = r#"<html><head><meta name="viewport" content="width=device-width, initial-scale=1"></head>
            <body>
              <button style="width: 30px; height: 30px">x</button>
              <img src="a.jpg" width="800" height="400">
              <img src="b.jpg" srcset="b-480.jpg 480w" style="max-width: 100%">
            </body></html>"#;
        let snapshot = snapshot_from_html(html, PHONE);
        let findings = scan(&snapshot, PHONE);
        let titles: Vec<&str> = findings.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Touch targets too small",
                "Horizontal overflow",
                "Images are not responsive"
            ]
        );
        assert!(findings.iter().all(|f| f.category != IssueCategory::Success));
    }
}
