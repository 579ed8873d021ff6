//! crates/responsive_core/src/contrast.rs
//!
//! WCAG 2.x colour contrast: colour parsing, relative luminance, contrast ratio,
//! and an audit of the foreground/background pairs declared in a page.

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::css::{describe_element, StyleIndex};

pub const AA_NORMAL_TEXT: f64 = 4.5;
pub const AA_LARGE_TEXT: f64 = 3.0;
pub const AAA_NORMAL_TEXT: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(...)`, `rgba(...)` (alpha ignored) and
    /// a handful of named colours.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if value.starts_with("rgb") {
            return parse_rgb_function(&value);
        }
        named_color(&value)
    }

    /// Relative luminance as defined by WCAG 2.x.
    pub fn relative_luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let expand = |c: char| -> Option<u8> {
        let v = c.to_digit(16)? as u8;
        Some(v * 17)
    };
    match hex.len() {
        3 | 4 => {
            let mut chars = hex.chars();
            Some(Rgb::new(
                expand(chars.next()?)?,
                expand(chars.next()?)?,
                expand(chars.next()?)?,
            ))
        }
        6 | 8 => Some(Rgb::new(
            u8::from_str_radix(hex.get(0..2)?, 16).ok()?,
            u8::from_str_radix(hex.get(2..4)?, 16).ok()?,
            u8::from_str_radix(hex.get(4..6)?, 16).ok()?,
        )),
        _ => None,
    }
}

fn rgb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgba?\(\s*(\d{1,3})[\s,]+(\d{1,3})[\s,]+(\d{1,3})\s*(?:[,/]\s*[\d.]+%?\s*)?\)$")
            .expect("rgb pattern is valid")
    })
}

fn parse_rgb_function(value: &str) -> Option<Rgb> {
    let caps = rgb_regex().captures(value)?;
    let channel = |i: usize| -> Option<u8> {
        let v: u16 = caps.get(i)?.as_str().parse().ok()?;
        Some(v.min(255) as u8)
    };
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "black" => Rgb::BLACK,
        "white" => Rgb::WHITE,
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "lightgray" | "lightgrey" => Rgb::new(211, 211, 211),
        "darkgray" | "darkgrey" => Rgb::new(169, 169, 169),
        "navy" => Rgb::new(0, 0, 128),
        "teal" => Rgb::new(0, 128, 128),
        "maroon" => Rgb::new(128, 0, 0),
        _ => return None,
    };
    Some(rgb)
}

/// Contrast ratio between two colours, from 1.0 to 21.0. Symmetric.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

//=========================================================================================
// Page Audit
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub selector: String,
    pub foreground: Rgb,
    pub background: Rgb,
    /// Rounded to two decimals.
    pub ratio: f64,
    pub aa_normal: bool,
    pub aa_large: bool,
    pub aaa: bool,
}

impl ContrastCheck {
    pub fn new(selector: impl Into<String>, foreground: Rgb, background: Rgb) -> Self {
        let ratio = contrast_ratio(foreground, background);
        Self {
            selector: selector.into(),
            foreground,
            background,
            ratio: (ratio * 100.0).round() / 100.0,
            aa_normal: ratio >= AA_NORMAL_TEXT,
            aa_large: ratio >= AA_LARGE_TEXT,
            aaa: ratio >= AAA_NORMAL_TEXT,
        }
    }
}

fn background_of(styles: &StyleIndex, element: &scraper::ElementRef<'_>) -> Option<Rgb> {
    let own = |el: &scraper::ElementRef<'_>| {
        styles
            .get(el, "background-color")
            .and_then(Rgb::parse)
            .or_else(|| styles.get(el, "background").and_then(Rgb::parse))
    };
    own(element).or_else(|| {
        element
            .ancestors()
            .filter_map(scraper::ElementRef::wrap)
            .find_map(|ancestor| own(&ancestor))
    })
}

/// Rates every element that declares a text or background colour against its
/// effective counterpart. Unset colours default to black text on white.
pub fn audit_colors(html: &str) -> Vec<ContrastCheck> {
    let document = Html::parse_document(html);
    let styles = StyleIndex::build(&document);
    let mut seen = HashSet::new();
    let mut checks = Vec::new();

    let Ok(selector) = Selector::parse("body, body *") else {
        return checks;
    };
    for element in document.select(&selector) {
        let declares_color = styles.get(&element, "color").is_some()
            || styles.get(&element, "background-color").is_some()
            || styles.get(&element, "background").is_some();
        if !declares_color {
            continue;
        }
        let foreground = styles
            .inherited(&element, "color")
            .and_then(Rgb::parse)
            .unwrap_or(Rgb::BLACK);
        let background = background_of(&styles, &element).unwrap_or(Rgb::WHITE);

        let label = describe_element(&element);
        if seen.insert((label.clone(), foreground, background)) {
            checks.push(ContrastCheck::new(label, foreground, background));
        }
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_on_black_is_exactly_21() {
        assert_eq!(contrast_ratio(Rgb::WHITE, Rgb::BLACK), 21.0);
        assert_eq!(contrast_ratio(Rgb::BLACK, Rgb::WHITE), 21.0);
    }

    #[test]
    fn ratio_is_symmetric_and_at_least_one() {
        let pairs = [
            (Rgb::new(119, 119, 119), Rgb::WHITE),
            (Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)),
            (Rgb::new(10, 200, 30), Rgb::new(10, 200, 30)),
        ];
        for (a, b) in pairs {
            assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
            assert!(contrast_ratio(a, b) >= 1.0);
        }
        assert_eq!(contrast_ratio(Rgb::new(10, 200, 30), Rgb::new(10, 200, 30)), 1.0);
    }

    #[test]
    fn grey_777_on_white_fails_aa_normal() {
        let check = ContrastCheck::new("p", Rgb::parse("#777").unwrap(), Rgb::WHITE);
        assert_eq!(check.ratio, 4.48);
        assert!(!check.aa_normal);
        assert!(check.aa_large);
    }

    #[test]
    fn parses_common_notations() {
        assert_eq!(Rgb::parse("#FFF"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#336699"), Some(Rgb::new(0x33, 0x66, 0x99)));
        assert_eq!(Rgb::parse("rgb(10, 20, 30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse("rgba(10,20,30,0.5)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse("rgb(10 20 30 / 50%)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse("Navy"), Some(Rgb::new(0, 0, 128)));
        assert_eq!(Rgb::parse("var(--brand)"), None);
        assert_eq!(Rgb::WHITE.to_string(), "#ffffff");
    }

    #[test]
    fn audit_pairs_declared_colors_with_inherited_background() {
        let html = r#"<html><head><style>.hero { background-color: #000 }</style></head>
            <body><section class="hero"><h1 style="color: #fff">Hi</h1><p style="color:#222">low</p></section>
            <footer style="color: #999">muted</footer></body></html>"#;
        let checks = audit_colors(html);
        let by_label = |label: &str| checks.iter().find(|c| c.selector == label).unwrap();

        assert_eq!(by_label("h1").ratio, 21.0);
        assert!(!by_label("p").aa_normal);
        assert_eq!(by_label("footer").background, Rgb::WHITE);
        assert_eq!(by_label("section.hero").foreground, Rgb::BLACK);
    }
}
