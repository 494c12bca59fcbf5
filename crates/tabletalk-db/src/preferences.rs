//! Preference repository.
//!
//! Owns one `UserPreferences` document per user. Implementations must
//! guarantee at most one document per user id, even when two callers race to
//! create it, and must make `reset` a single replace (never delete-then-create).

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tabletalk_common::entities::MealAttributes;
use tabletalk_common::InteractionType;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{DbError, Result};
use crate::learning::apply_interaction;
use crate::schema::{PreferencePatch, UserPreferences};

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Stored document, if any. Never creates.
    async fn find(&self, user_id: &str) -> Result<Option<UserPreferences>>;

    /// Stored document, creating the default one on first access.
    async fn get_or_create(&self, user_id: &str) -> Result<UserPreferences>;

    /// Count the interaction and, when learning is on, learn from `meal`.
    async fn record_interaction(
        &self,
        user_id: &str,
        kind: InteractionType,
        meal: Option<&MealAttributes>,
    ) -> Result<UserPreferences>;

    /// Validate and merge a partial update.
    async fn update(&self, user_id: &str, patch: &PreferencePatch) -> Result<UserPreferences>;

    /// Replace the stored document with fresh defaults.
    async fn reset(&self, user_id: &str) -> Result<UserPreferences>;
}

pub(crate) fn check_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(DbError::Validation("user id must not be empty".to_string()));
    }
    Ok(())
}

// ── In-memory implementation ────────────────────────────────────────────────

/// Process-local store. A single write lock serialises every read-modify-write.
#[derive(Default)]
pub struct InMemoryPreferenceRepository {
    docs: RwLock<HashMap<String, UserPreferences>>,
}

impl InMemoryPreferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceRepository {
    async fn find(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        check_user_id(user_id)?;
        Ok(self.docs.read().await.get(user_id).cloned())
    }

    async fn get_or_create(&self, user_id: &str) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        if let Some(existing) = self.docs.read().await.get(user_id) {
            return Ok(existing.clone());
        }

        let mut docs = self.docs.write().await;
        let doc = docs.entry(user_id.to_string()).or_insert_with(|| {
            info!(user_id, "Created default preferences");
            UserPreferences::new(user_id, Utc::now())
        });
        Ok(doc.clone())
    }

    async fn record_interaction(
        &self,
        user_id: &str,
        kind: InteractionType,
        meal: Option<&MealAttributes>,
    ) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let now = Utc::now();
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(user_id.to_string())
            .or_insert_with(|| UserPreferences::new(user_id, now));
        apply_interaction(doc, kind, meal, now);
        debug!(user_id, interaction = %kind, learned = meal.is_some(), "Recorded interaction");
        Ok(doc.clone())
    }

    async fn update(&self, user_id: &str, patch: &PreferencePatch) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let now = Utc::now();
        let mut docs = self.docs.write().await;

        // Validate against a copy so a rejected patch never leaves a
        // half-created document behind.
        let mut doc = docs
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserPreferences::new(user_id, now));
        doc.vector.apply_patch(patch)?;
        doc.updated_at = now;
        docs.insert(user_id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn reset(&self, user_id: &str) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let fresh = UserPreferences::new(user_id, Utc::now());
        self.docs.write().await.insert(user_id.to_string(), fresh.clone());
        info!(user_id, "Reset preferences to defaults");
        Ok(fresh)
    }
}
