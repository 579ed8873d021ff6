//! crates/responsive_core/src/progress.rs
//!
//! Points, levels and achievements. Pure bookkeeping on a `UserProgress`; the
//! store that holds the records lives behind the `ProgressStore` port.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{Achievement, UserProgress};

pub const POINTS_PER_LEVEL: u32 = 100;

/// A user-triggered action that earns points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProgressAction {
    ScanRun,
    AiAnalysis,
    FixesGenerated,
    FixesApplied,
    #[serde(rename_all = "camelCase")]
    DeviceTested { device_id: String },
}

impl ProgressAction {
    pub fn points(&self) -> u32 {
        match self {
            ProgressAction::ScanRun => 10,
            ProgressAction::AiAnalysis => 20,
            ProgressAction::FixesGenerated => 25,
            ProgressAction::FixesApplied => 50,
            ProgressAction::DeviceTested { .. } => 5,
        }
    }
}

/// The result of recording an action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub progress: UserProgress,
    pub points_awarded: u32,
    pub unlocked: Vec<Achievement>,
}

struct AchievementRule {
    achievement: Achievement,
    unlocked: fn(&UserProgress) -> bool,
}

const RULES: &[AchievementRule] = &[
    AchievementRule {
        achievement: Achievement {
            id: "first-scan",
            title: "First Scan",
            description: "Ran your first responsive scan.",
        },
        unlocked: |p| p.counters.scans >= 1,
    },
    AchievementRule {
        achievement: Achievement {
            id: "scan-veteran",
            title: "Scan Veteran",
            description: "Ran 25 responsive scans.",
        },
        unlocked: |p| p.counters.scans >= 25,
    },
    AchievementRule {
        achievement: Achievement {
            id: "ai-explorer",
            title: "AI Explorer",
            description: "Requested 5 AI analyses.",
        },
        unlocked: |p| p.counters.ai_analyses >= 5,
    },
    AchievementRule {
        achievement: Achievement {
            id: "first-fix",
            title: "First Fix",
            description: "Generated your first set of CSS fixes.",
        },
        unlocked: |p| p.counters.fixes_generated >= 1,
    },
    AchievementRule {
        achievement: Achievement {
            id: "fix-deployer",
            title: "Fix Deployer",
            description: "Applied generated CSS to a live site.",
        },
        unlocked: |p| p.counters.fixes_applied >= 1,
    },
    AchievementRule {
        achievement: Achievement {
            id: "device-collector",
            title: "Device Collector",
            description: "Tested on 5 different devices.",
        },
        unlocked: |p| p.counters.devices_tested >= 5,
    },
    AchievementRule {
        achievement: Achievement {
            id: "level-5",
            title: "Level 5",
            description: "Reached level 5.",
        },
        unlocked: |p| p.level >= 5,
    },
];

/// All achievements that can be unlocked.
pub fn achievements() -> impl Iterator<Item = &'static Achievement> {
    RULES.iter().map(|rule| &rule.achievement)
}

pub fn level_for(points: u32) -> u32 {
    1 + points / POINTS_PER_LEVEL
}

/// Applies `action` to `progress`, returning the points awarded and any
/// achievements unlocked by it. Testing an already-tested device scores nothing.
pub fn apply_action(progress: &mut UserProgress, action: &ProgressAction) -> (u32, Vec<Achievement>) {
    let counters = &mut progress.counters;
    let awarded = match action {
        ProgressAction::ScanRun => {
            counters.scans += 1;
            action.points()
        }
        ProgressAction::AiAnalysis => {
            counters.ai_analyses += 1;
            action.points()
        }
        ProgressAction::FixesGenerated => {
            counters.fixes_generated += 1;
            action.points()
        }
        ProgressAction::FixesApplied => {
            counters.fixes_applied += 1;
            action.points()
        }
        ProgressAction::DeviceTested { device_id } => {
            if progress.tested_devices.insert(device_id.clone()) {
                counters.devices_tested += 1;
                action.points()
            } else {
                0
            }
        }
    };

    progress.points += awarded;
    progress.level = level_for(progress.points);
    progress.updated_at = Utc::now();

    let mut unlocked = Vec::new();
    for rule in RULES {
        if !progress.achievements.contains(rule.achievement.id) && (rule.unlocked)(progress) {
            progress.achievements.insert(rule.achievement.id.to_string());
            unlocked.push(rule.achievement.clone());
        }
    }
    (awarded, unlocked)
}
