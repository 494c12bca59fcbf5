//! PostgreSQL-backed preference repository.
//!
//! One JSONB document per user, keyed by `user_id`. The primary key gives the
//! at-most-one-row guarantee; read-modify-write paths lock the row with
//! `SELECT ... FOR UPDATE` inside a transaction.
//!
//! The whole `UserPreferences` document, area and advanced sections included,
//! lives in the `data` column, so new fields need no migration.

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::{Manager, Pool};
use tabletalk_common::entities::MealAttributes;
use tabletalk_common::InteractionType;
use tokio_postgres::types::Json;
use tokio_postgres::NoTls;
use tracing::info;

use crate::error::{DbError, Result};
use crate::learning::apply_interaction;
use crate::preferences::{check_user_id, PreferenceRepository};
use crate::schema::{PreferencePatch, UserPreferences, TABLE_USER_PREFERENCES};

#[derive(Clone)]
pub struct PgPreferenceRepository {
    pool: Pool,
}

impl PgPreferenceRepository {
    /// Build a pool for `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, max_connections: usize) -> Result<Self> {
        let pg_config: tokio_postgres::Config = database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::Storage(format!("invalid database url: {e}")))?;
        let manager = Manager::new(pg_config, NoTls);
        let pool = Pool::builder(manager)
            .max_size(max_connections)
            .build()
            .map_err(|e| DbError::Storage(format!("failed to build pool: {e}")))?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    pub async fn initialize(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(&format!(
                "CREATE TABLE IF NOT EXISTS {TABLE_USER_PREFERENCES} (
                    user_id    TEXT PRIMARY KEY,
                    data       JSONB NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                )"
            ))
            .await?;
        info!(table = TABLE_USER_PREFERENCES, "Preference table ready");
        Ok(())
    }

    /// Lock the user's row inside a transaction, creating it first if needed,
    /// let `mutate` change it, then write it back.
    async fn modify<F>(&self, user_id: &str, mutate: F) -> Result<UserPreferences>
    where
        F: FnOnce(&mut UserPreferences) -> Result<()> + Send,
    {
        let now = Utc::now();
        let fresh = UserPreferences::new(user_id, now);

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        tx.execute(
            &format!(
                "INSERT INTO {TABLE_USER_PREFERENCES} (user_id, data, updated_at)
                 VALUES ($1, $2, $3) ON CONFLICT (user_id) DO NOTHING"
            ),
            &[&user_id, &Json(&fresh), &now],
        )
        .await?;
        let row = tx
            .query_one(
                &format!("SELECT data FROM {TABLE_USER_PREFERENCES} WHERE user_id = $1 FOR UPDATE"),
                &[&user_id],
            )
            .await?;
        let Json(mut doc): Json<UserPreferences> = row.try_get(0)?;

        // Returning early drops `tx`, which rolls back.
        mutate(&mut doc)?;

        tx.execute(
            &format!("UPDATE {TABLE_USER_PREFERENCES} SET data = $2, updated_at = $3 WHERE user_id = $1"),
            &[&user_id, &Json(&doc), &doc.updated_at],
        )
        .await?;
        tx.commit().await?;
        Ok(doc)
    }
}

#[async_trait]
impl PreferenceRepository for PgPreferenceRepository {
    async fn find(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        check_user_id(user_id)?;
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT data FROM {TABLE_USER_PREFERENCES} WHERE user_id = $1"),
                &[&user_id],
            )
            .await?;
        match row {
            Some(row) => {
                let Json(doc): Json<UserPreferences> = row.try_get(0)?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn get_or_create(&self, user_id: &str) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let now = Utc::now();
        let fresh = UserPreferences::new(user_id, now);
        let client = self.pool.get().await?;
        let inserted = client
            .execute(
                &format!(
                    "INSERT INTO {TABLE_USER_PREFERENCES} (user_id, data, updated_at)
                     VALUES ($1, $2, $3) ON CONFLICT (user_id) DO NOTHING"
                ),
                &[&user_id, &Json(&fresh), &now],
            )
            .await?;
        if inserted == 1 {
            info!(user_id, "Created default preferences");
            return Ok(fresh);
        }

        let row = client
            .query_one(
                &format!("SELECT data FROM {TABLE_USER_PREFERENCES} WHERE user_id = $1"),
                &[&user_id],
            )
            .await?;
        let Json(doc): Json<UserPreferences> = row.try_get(0)?;
        Ok(doc)
    }

    async fn record_interaction(
        &self,
        user_id: &str,
        kind: InteractionType,
        meal: Option<&MealAttributes>,
    ) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let meal = meal.cloned();
        self.modify(user_id, move |doc| {
            apply_interaction(doc, kind, meal.as_ref(), Utc::now());
            Ok(())
        })
        .await
    }

    async fn update(&self, user_id: &str, patch: &PreferencePatch) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let patch = patch.clone();
        self.modify(user_id, move |doc| {
            doc.vector.apply_patch(&patch)?;
            doc.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn reset(&self, user_id: &str) -> Result<UserPreferences> {
        check_user_id(user_id)?;
        let fresh = UserPreferences::new(user_id, Utc::now());
        let client = self.pool.get().await?;
        client
            .execute(
                &format!(
                    "INSERT INTO {TABLE_USER_PREFERENCES} (user_id, data, updated_at)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at"
                ),
                &[&user_id, &Json(&fresh), &fresh.updated_at],
            )
            .await?;
        info!(user_id, "Reset preferences to defaults");
        Ok(fresh)
    }
}
