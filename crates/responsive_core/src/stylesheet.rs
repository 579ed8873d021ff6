//! crates/responsive_core/src/stylesheet.rs
//!
//! Renders a fix set into a single stylesheet, and injects or removes that
//! stylesheet in a previewed document through one `<style>` node with a fixed id.

use std::fmt::Write;

use crate::domain::FixSet;

/// The id of the `<style>` element that carries generated fixes in a preview.
pub const PREVIEW_STYLE_ID: &str = "responsive-tester-fixes";

/// Renders fixes and media queries into CSS text.
///
/// Output depends only on the inputs: one rule block per fix in order, then one
/// `@media` block per media query with its rules in order.
pub fn synthesize(url: &str, fix_set: &FixSet) -> String {
    let mut css = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(css, "/* Generated fixes for {} */", sanitize_comment(url));

    for fix in &fix_set.fixes {
        css.push('\n');
        let _ = writeln!(
            css,
            "/* {} (impact: {}) */",
            sanitize_comment(&fix.description),
            fix.impact.as_str()
        );
        write_rule(&mut css, &fix.selector, &fix.css, "");
    }

    for media in &fix_set.media_queries {
        css.push('\n');
        let _ = writeln!(css, "@media {} {{", media.query.trim());
        for rule in &media.rules {
            write_rule(&mut css, &rule.selector, &rule.css, "  ");
        }
        css.push_str("}\n");
    }
    css
}

fn write_rule(out: &mut String, selector: &str, body: &str, indent: &str) {
    let _ = writeln!(out, "{}{} {{", indent, selector.trim());
    for line in body
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        let _ = writeln!(out, "{}  {}", indent, line);
    }
    let _ = writeln!(out, "{}}}", indent);
}

/// Keeps caller or model text from closing the surrounding comment early.
fn sanitize_comment(text: &str) -> String {
    text.replace("*/", "* /").replace('\n', " ").trim().to_string()
}

//=========================================================================================
// Preview Injection
//=========================================================================================

/// Inserts (or replaces) the preview `<style>` element in `html`.
///
/// The element goes right before `</head>`, or at the very start when the document
/// has no head.
pub fn inject_preview_style(html: &str, css: &str) -> String {
    let html = remove_preview_style(html);
    let tag = format!("<style id=\"{}\">\n{}</style>", PREVIEW_STYLE_ID, css.replace("</style", "<\\/style"));
    match find_ascii_case_insensitive(&html, "</head>") {
        Some(pos) => format!("{}{}{}", &html[..pos], tag, &html[pos..]),
        None => format!("{}{}", tag, html),
    }
}

/// Removes the preview `<style>` element from `html`, if present.
pub fn remove_preview_style(html: &str) -> String {
    let open = format!("<style id=\"{}\">", PREVIEW_STYLE_ID);
    let Some(start) = html.find(&open) else {
        return html.to_string();
    };
    match find_ascii_case_insensitive(&html[start..], "</style>") {
        Some(rel_end) => {
            let end = start + rel_end + "</style>".len();
            format!("{}{}", &html[..start], &html[end..])
        }
        None => html[..start].to_string(),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CssFix, CssRule, Impact, MediaQuery};

    fn sample() -> FixSet {
        FixSet {
            fixes: vec![
                CssFix {
                    selector: "img".into(),
                    css: "max-width: 100%;\nheight: auto;".into(),
                    description: "Keep images inside the viewport".into(),
                    impact: Impact::High,
                },
                CssFix {
                    selector: ".nav a".into(),
                    css: "min-height: 44px;".into(),
                    description: "Larger tap targets".into(),
                    impact: Impact::Medium,
                },
            ],
            media_queries: vec![MediaQuery {
                query: "(max-width: 768px)".into(),
                rules: vec![CssRule {
                    selector: ".sidebar".into(),
                    css: "display: none;".into(),
                }],
            }],
        }
    }

    #[test]
    fn renders_header_fixes_then_media_blocks() {
        let css = synthesize("https://example.com", &sample());
        let expected = concat!(
            "/* Generated fixes for https://example.com */\n",
            "\n",
            "/* Keep images inside the viewport (impact: high) */\n",
            "img {\n",
            "  max-width: 100%;\n",
            "  height: auto;\n",
            "}\n",
            "\n",
            "/* Larger tap targets (impact: medium) */\n",
            ".nav a {\n",
            "  min-height: 44px;\n",
            "}\n",
            "\n",
            "@media (max-width: 768px) {\n",
            "  .sidebar {\n",
            "    display: none;\n",
            "  }\n",
            "}\n",
        );
        assert_eq!(css, expected);
    }

    #[test]
    fn synthesis_is_repeatable() {
        let fixes = sample();
        assert_eq!(
            synthesize("https://example.com", &fixes),
            synthesize("https://example.com", &fixes)
        );
    }

    #[test]
    fn empty_fix_set_is_just_the_header() {
        assert_eq!(
            synthesize("https://a.test", &FixSet::default()),
            "/* Generated fixes for https://a.test */\n"
        );
    }

    #[test]
    fn url_cannot_close_the_header_comment() {
        assert_eq!(
            synthesize("https://a.test/*/x", &FixSet::default()),
            "/* Generated fixes for https://a.test/* /x */\n"
        );
    }

    #[test]
    fn comment_terminators_are_neutralised() {
        let mut fixes = sample();
        fixes.fixes[0].description = "evil */ body { display:none }".into();
        let css = synthesize("u", &fixes);
        assert!(css.contains("/* evil * / body { display:none } (impact: high) */"));
    }

    #[test]
    fn preview_style_toggles_on_and_off() {
        let page = "<html><HEAD><title>t</title></HEAD><body></body></html>";
        let on = inject_preview_style(page, "p { color: red; }\n");
        assert_eq!(
            on,
            "<html><HEAD><title>t</title><style id=\"responsive-tester-fixes\">\np { color: red; }\n</style></HEAD><body></body></html>"
        );

        let replaced = inject_preview_style(&on, "a {}\n");
        assert_eq!(replaced.matches(PREVIEW_STYLE_ID).count(), 1);
        assert!(replaced.contains("a {}"));
        assert!(!replaced.contains("color: red"));

        assert_eq!(remove_preview_style(&on), page);
    }

    #[test]
    fn preview_without_head_is_prepended() {
        let out = inject_preview_style("<p>hi</p>", "p{}");
        assert!(out.starts_with("<style id=\"responsive-tester-fixes\">"));
        assert!(out.ends_with("<p>hi</p>"));
    }
}
