//! crates/responsive_core/src/css.rs
//!
//! Just enough CSS handling to approximate declared styles from raw HTML:
//! top-level rules from `<style>` blocks, inline `style` attributes and
//! length parsing. There is no cascade beyond "later wins, inline wins".

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Root font size used to resolve `em`, `rem` and percentages.
pub const BASE_FONT_SIZE_PX: f64 = 16.0;

/// A style rule with its raw selector text and declarations in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Parses a declaration block such as `color: red; font-size: 12px`.
/// Property names are lowercased; `!important` is dropped.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim();
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((prop, value.to_string()))
        })
        .collect()
}

/// Extracts top-level style rules from a stylesheet. At-rule blocks (`@media`,
/// `@font-face`, ...) and comments are skipped.
pub fn parse_top_level_rules(css: &str) -> Vec<StyleRule> {
    let css = strip_comments(css);
    let mut rules = Vec::new();
    let mut prelude = String::new();
    let mut chars = css.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut depth = 1;
                let mut body = String::new();
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    body.push(inner);
                }
                let selector = prelude.trim().to_string();
                prelude.clear();
                if selector.is_empty() || selector.starts_with('@') {
                    continue;
                }
                rules.push(StyleRule {
                    selector,
                    declarations: parse_declarations(&body),
                });
            }
            // A bodiless at-rule such as `@import url(x);`
            ';' if prelude.trim_start().starts_with('@') => prelude.clear(),
            _ => prelude.push(c),
        }
    }
    rules
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn length_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(-?\d*\.?\d+)\s*(px|pt|em|rem|vw|%)?\s*$").expect("length pattern is valid")
    })
}

/// Resolves a CSS length to pixels. Percentages resolve against `percent_of`,
/// `em` against the element's font size `em_px`, `vw` against `viewport_width`.
/// Unitless numbers are treated as pixels (HTML attribute style).
pub fn parse_length_px(value: &str, percent_of: f64, em_px: f64, viewport_width: u32) -> Option<f64> {
    let caps = length_regex().captures(value)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    let px = match caps.get(2).map(|m| m.as_str()) {
        None | Some("px") => number,
        Some("pt") => number * 4.0 / 3.0,
        Some("em") => number * em_px,
        Some("rem") => number * BASE_FONT_SIZE_PX,
        Some("%") => number * percent_of / 100.0,
        Some("vw") => number * f64::from(viewport_width) / 100.0,
        Some(_) => return None,
    };
    Some(px)
}

/// Resolves a `font-size` value, including the absolute-size keywords.
pub fn parse_font_size_px(value: &str, parent_px: f64, viewport_width: u32) -> Option<f64> {
    let keyword = match value.trim().to_ascii_lowercase().as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    keyword.or_else(|| parse_length_px(value, parent_px, parent_px, viewport_width))
}

//=========================================================================================
// Style Index
//=========================================================================================

/// Declared styles per element of a parsed document.
pub struct StyleIndex {
    styles: HashMap<NodeId, HashMap<String, String>>,
}

impl StyleIndex {
    pub fn build(document: &Html) -> Self {
        let mut styles: HashMap<NodeId, HashMap<String, String>> = HashMap::new();

        let mut sheet = String::new();
        if let Ok(style_selector) = Selector::parse("style") {
            for style in document.select(&style_selector) {
                sheet.extend(style.text());
                sheet.push('\n');
            }
        }

        for rule in parse_top_level_rules(&sheet) {
            let selector = match Selector::parse(&rule.selector) {
                Ok(selector) => selector,
                Err(e) => {
                    debug!("Skipping unsupported selector '{}': {:?}", rule.selector, e);
                    continue;
                }
            };
            for element in document.select(&selector) {
                let entry = styles.entry(element.id()).or_default();
                for (prop, value) in &rule.declarations {
                    entry.insert(prop.clone(), value.clone());
                }
            }
        }

        if let Ok(inline_selector) = Selector::parse("[style]") {
            for element in document.select(&inline_selector) {
                let Some(inline) = element.value().attr("style") else {
                    continue;
                };
                let entry = styles.entry(element.id()).or_default();
                for (prop, value) in parse_declarations(inline) {
                    entry.insert(prop, value);
                }
            }
        }

        Self { styles }
    }

    /// The element's own declared value for `property`.
    pub fn get(&self, element: &ElementRef<'_>, property: &str) -> Option<&str> {
        self.styles
            .get(&element.id())
            .and_then(|decls| decls.get(property))
            .map(String::as_str)
    }

    /// The value declared on the element or, failing that, its nearest ancestor.
    pub fn inherited(&self, element: &ElementRef<'_>, property: &str) -> Option<&str> {
        self.get(element, property).or_else(|| {
            element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find_map(|ancestor| self.get(&ancestor, property))
        })
    }

    /// Resolves the effective font size, walking from the root down so relative
    /// units compound the way browsers apply them.
    pub fn font_size_px(&self, element: &ElementRef<'_>, viewport_width: u32) -> f64 {
        let mut chain: Vec<ElementRef<'_>> = element.ancestors().filter_map(ElementRef::wrap).collect();
        chain.reverse();
        chain.push(*element);

        chain.iter().fold(BASE_FONT_SIZE_PX, |parent_px, el| {
            self.get(el, "font-size")
                .and_then(|value| parse_font_size_px(value, parent_px, viewport_width))
                .unwrap_or(parent_px)
        })
    }
}

/// A short human label for an element, e.g. `div#main.card`.
pub fn describe_element(element: &ElementRef<'_>) -> String {
    let value = element.value();
    let mut label = value.name().to_string();
    if let Some(id) = value.id() {
        label.push('#');
        label.push_str(id);
    }
    for class in value.classes().take(2) {
        label.push('.');
        label.push_str(class);
    }
    label
}
