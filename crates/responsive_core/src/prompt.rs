//! crates/responsive_core/src/prompt.rs
//!
//! Builds the prompts sent to the completion service and validates what comes back.
//! Anything the model returns that does not match the expected shape is a
//! `PortError::Parse`, never a transport error.

use serde_json::Value;

use crate::domain::{CssFix, CssRule, DesignIssue, DeviceInfo, Finding, FixSet, Impact, MediaQuery};
use crate::ports::{PortError, PortResult};

/// Maximum number of HTML characters included in a design review prompt.
pub const MAX_HTML_CHARS: usize = 12_000;

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert front-end developer specialising in responsive web design and mobile usability. \
Explain problems in plain language, say why they matter on the given device, and suggest concrete fixes. \
Be concise and use short paragraphs or bullet points.";

pub const CSS_FIX_SYSTEM_PROMPT: &str = r#"You are a CSS expert who writes minimal, safe fixes for responsive design problems.
Respond with a single JSON object and nothing else, using exactly this shape:
{
  "fixes": [
    {"selector": "css selector", "css": "property: value; ...", "description": "what the fix does", "impact": "high|medium|low"}
  ],
  "mediaQueries": [
    {"query": "(max-width: 768px)", "rules": [{"selector": "css selector", "css": "property: value; ..."}]}
  ]
}
Use empty arrays when there is nothing to add. Do not wrap the CSS in braces."#;

pub const DESIGN_SYSTEM_PROMPT: &str = r#"You are a senior UI reviewer. Inspect the HTML of a page rendered at the given viewport and list design problems that affect small screens.
Respond with a single JSON object and nothing else, using exactly this shape:
{
  "issues": [
    {"type": "layout|typography|navigation|media|accessibility|other", "severity": "high|medium|low", "description": "the problem", "element": "optional selector or tag", "suggestion": "optional fix"}
  ]
}"#;

/// Reply used when the scan found nothing, so no completion call is needed.
pub const NO_ISSUES_ANALYSIS: &str = "No responsive design issues were detected on this device. The page has a viewport meta tag, readable text, adequately sized touch targets, no horizontal overflow and responsive images.";

fn render_findings(findings: &[Finding]) -> String {
    let problems: Vec<String> = findings
        .iter()
        .filter(|f| f.is_problem())
        .enumerate()
        .map(|(i, f)| {
            let element = f
                .element
                .as_deref()
                .map(|e| format!(" (element: <{}>)", e))
                .unwrap_or_default();
            format!(
                "{}. [{}] {}: {}{}",
                i + 1,
                f.category.as_str().to_uppercase(),
                f.title,
                f.description,
                element
            )
        })
        .collect();
    problems.join("\n")
}

fn render_device(device: &DeviceInfo) -> String {
    format!("{} viewport, {}x{} CSS pixels", device.device_type, device.width, device.height)
}

/// Prompt for the free-form analysis of scan findings.
pub fn build_analysis_prompt(url: &str, device: &DeviceInfo, findings: &[Finding]) -> String {
    format!(
        "Website: {url}\nDevice: {device}\n\nThe automated responsive checks found these issues:\n{issues}\n\n\
For each issue, explain the impact on users of this device and recommend how to fix it. \
Finish with the single most important change to make first.",
        url = url,
        device = render_device(device),
        issues = render_findings(findings),
    )
}

/// Prompt asking for a JSON fix set addressing the findings.
pub fn build_css_fix_prompt(url: &str, device: &DeviceInfo, findings: &[Finding]) -> String {
    format!(
        "Website: {url}\nDevice: {device}\n\nIssues to fix:\n{issues}\n\n\
Write CSS fixes for these issues. Prefer targeted selectors, and put viewport-specific rules in mediaQueries \
sized for a {width}px wide screen.",
        url = url,
        device = render_device(device),
        issues = render_findings(findings),
        width = device.width,
    )
}

/// Prompt asking for a JSON list of design issues in the given HTML.
pub fn build_design_prompt(url: &str, html: &str, viewport_width: u32, viewport_height: u32) -> String {
    let truncated: String = html.chars().take(MAX_HTML_CHARS).collect();
    let note = if truncated.len() < html.len() {
        "\n(HTML truncated.)"
    } else {
        ""
    };
    format!(
        "Website: {url}\nViewport: {w}x{h} CSS pixels\n\nHTML:\n```html\n{html}\n```{note}",
        url = url,
        w = viewport_width,
        h = viewport_height,
        html = truncated,
        note = note,
    )
}

//=========================================================================================
// Response Parsing
//=========================================================================================

/// Strips a surrounding markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_json(raw: &str) -> PortResult<Value> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PortError::Parse(format!("response is not valid JSON: {}", e)))
}

fn required_str(obj: &Value, field: &str, at: &str) -> PortResult<String> {
    match obj.get(field).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(PortError::Parse(format!("{}.{} must be a non-empty string", at, field))),
    }
}

fn optional_str(obj: &Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_array<'a>(obj: &'a Value, field: &str, at: &str) -> PortResult<&'a Vec<Value>> {
    obj.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| PortError::Parse(format!("{}.{} must be an array", at, field)))
}

fn required_impact(obj: &Value, field: &str, at: &str) -> PortResult<Impact> {
    let value = required_str(obj, field, at)?;
    Impact::parse(&value).ok_or_else(|| {
        PortError::Parse(format!(
            "{}.{} must be one of high, medium, low (got '{}')",
            at, field, value
        ))
    })
}

/// Validates a fix-set response: a `fixes` array and a `mediaQueries` array, each
/// entry field-checked.
pub fn parse_fix_set(raw: &str) -> PortResult<FixSet> {
    let root = parse_json(raw)?;
    if !root.is_object() {
        return Err(PortError::Parse("response must be a JSON object".to_string()));
    }

    let fixes = required_array(&root, "fixes", "response")?
        .iter()
        .enumerate()
        .map(|(i, fix)| {
            let at = format!("fixes[{}]", i);
            Ok(CssFix {
                selector: required_str(fix, "selector", &at)?,
                css: required_str(fix, "css", &at)?,
                description: required_str(fix, "description", &at)?,
                impact: required_impact(fix, "impact", &at)?,
            })
        })
        .collect::<PortResult<Vec<_>>>()?;

    let media_queries = required_array(&root, "mediaQueries", "response")?
        .iter()
        .enumerate()
        .map(|(i, media)| {
            let at = format!("mediaQueries[{}]", i);
            let rules = required_array(media, "rules", &at)?
                .iter()
                .enumerate()
                .map(|(j, rule)| {
                    let rule_at = format!("{}.rules[{}]", at, j);
                    Ok(CssRule {
                        selector: required_str(rule, "selector", &rule_at)?,
                        css: required_str(rule, "css", &rule_at)?,
                    })
                })
                .collect::<PortResult<Vec<_>>>()?;
            Ok(MediaQuery {
                query: required_str(media, "query", &at)?,
                rules,
            })
        })
        .collect::<PortResult<Vec<_>>>()?;

    Ok(FixSet {
        fixes,
        media_queries,
    })
}

/// Validates a design-review response. Accepts `{"issues": [...]}` or a bare array.
pub fn parse_design_issues(raw: &str) -> PortResult<Vec<DesignIssue>> {
    let root = parse_json(raw)?;
    let items = match &root {
        Value::Array(items) => items,
        Value::Object(_) => required_array(&root, "issues", "response")?,
        _ => {
            return Err(PortError::Parse(
                "response must be a JSON object or array".to_string(),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let at = format!("issues[{}]", i);
            Ok(DesignIssue {
                issue_type: required_str(item, "type", &at)?,
                severity: required_impact(item, "severity", &at)?,
                description: required_str(item, "description", &at)?,
                element: optional_str(item, "element"),
                suggestion: optional_str(item, "suggestion"),
            })
        })
        .collect()
}
