//! services/api/src/adapters/progress_store.rs
//!
//! Keeps per-user progress in memory. Implements the `ProgressStore` port; the
//! scoring rules themselves live in `responsive_core::progress`.

use async_trait::async_trait;
use responsive_core::{
    ports::{PortError, PortResult, ProgressStore},
    progress::{apply_action, ProgressAction, ProgressUpdate},
    UserProgress,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

const MAX_USER_ID_LEN: usize = 128;

#[derive(Default)]
pub struct InMemoryProgressStore {
    users: RwLock<HashMap<String, UserProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_user_id(user_id: &str) -> PortResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(PortError::invalid_field(
            "userId",
            format!("userId must be between 1 and {} characters", MAX_USER_ID_LEN),
        ));
    }
    Ok(user_id)
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get(&self, user_id: &str) -> PortResult<UserProgress> {
        let user_id = check_user_id(user_id)?;
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserProgress::new(user_id)))
    }

    async fn record(&self, user_id: &str, action: ProgressAction) -> PortResult<ProgressUpdate> {
        let user_id = check_user_id(user_id)?;
        if let ProgressAction::DeviceTested { device_id } = &action {
            if device_id.trim().is_empty() {
                return Err(PortError::invalid_field("deviceId", "deviceId must not be empty"));
            }
        }

        let mut users = self.users.write().await;
        let progress = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProgress::new(user_id));
        let (points_awarded, unlocked) = apply_action(progress, &action);
        debug!("{} earned {} points for {:?}", user_id, points_awarded, action);
        for achievement in &unlocked {
            info!("{} unlocked achievement '{}'", user_id, achievement.id);
        }

        Ok(ProgressUpdate {
            progress: progress.clone(),
            points_awarded,
            unlocked,
        })
    }

    async fn clear(&self) {
        let mut users = self.users.write().await;
        info!("Dropping progress for {} users", users.len());
        users.clear();
    }
}
