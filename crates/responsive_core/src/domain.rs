//! crates/responsive_core/src/domain.rs
//!
//! Defines the core data structures for the application: device reference data,
//! scan findings, generated CSS fixes and per-user progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

//=========================================================================================
// Devices
//=========================================================================================

/// The broad class of a device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Phone,
    Tablet,
    Laptop,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Phone => "phone",
            DeviceType::Tablet => "tablet",
            DeviceType::Laptop => "laptop",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A device profile from the catalog. The first screen size is portrait, the
/// optional second one landscape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub screen_sizes: Vec<ScreenSize>,
    pub os_versions: Vec<String>,
}

/// The payload used to add a device to the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub screen_sizes: Vec<ScreenSize>,
    #[serde(default)]
    pub os_versions: Vec<String>,
}

/// The subset of device metadata the analysis prompts care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

//=========================================================================================
// Findings
//=========================================================================================

/// Severity bucket of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Error,
    Warning,
    Success,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Error => "error",
            IssueCategory::Warning => "warning",
            IssueCategory::Success => "success",
        }
    }
}

/// One result produced by an analysis run. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: IssueCategory,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl Finding {
    pub fn new(category: IssueCategory, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category,
            title: title.into(),
            description: description.into(),
            element: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn is_problem(&self) -> bool {
        self.category != IssueCategory::Success
    }
}

/// Returns true when at least one finding is an error or a warning.
pub fn has_problems(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_problem)
}

//=========================================================================================
// Generated CSS
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Impact::High),
            "medium" => Some(Impact::Medium),
            "low" => Some(Impact::Low),
            _ => None,
        }
    }
}

/// A single CSS rule proposed to fix a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssFix {
    pub selector: String,
    pub css: String,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssRule {
    pub selector: String,
    pub css: String,
}

/// A media query with the rules nested inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaQuery {
    pub query: String,
    pub rules: Vec<CssRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixSet {
    pub fixes: Vec<CssFix>,
    pub media_queries: Vec<MediaQuery>,
}

impl FixSet {
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty() && self.media_queries.is_empty()
    }
}

/// A design problem reported by the completion service for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Impact,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

//=========================================================================================
// Progress
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCounters {
    pub scans: u32,
    pub ai_analyses: u32,
    pub fixes_generated: u32,
    pub fixes_applied: u32,
    pub devices_tested: u32,
}

/// Gamification state for one user. Held in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub points: u32,
    pub level: u32,
    pub counters: ProgressCounters,
    pub tested_devices: BTreeSet<String>,
    pub achievements: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            points: 0,
            level: 1,
            counters: ProgressCounters::default(),
            tested_devices: BTreeSet::new(),
            achievements: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }
}

/// An achievement definition as shown to the user once unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}
