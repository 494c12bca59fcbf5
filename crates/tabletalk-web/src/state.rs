//! Shared application state for the web server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabletalk_db::{InMemoryMealRepository, InMemoryPreferenceRepository, MealRepository, PreferenceRepository};
use tabletalk_ranker::{MealRepositoryAdapter, Recommender};
use tokio::sync::broadcast;
use tracing::info;

use crate::config::{Config, StorageBackend};

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A recommendation list was served
    RecommendationsServed { user_id: String, count: usize, provider: String },
    /// An interaction was tracked
    InteractionRecorded { user_id: String, interaction: String },
    /// Preferences were edited by the user
    PreferencesUpdated { user_id: String },
    /// Preferences were reset to defaults
    PreferencesReset { user_id: String },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    pub preferences: Arc<dyn PreferenceRepository>,
    pub meals: Arc<dyn MealRepository>,
    pub recommender: Recommender,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        preferences: Arc<dyn PreferenceRepository>,
        meals: Arc<dyn MealRepository>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let history = Arc::new(MealRepositoryAdapter::new(meals.clone()));
        let recommender = Recommender::new(preferences.clone(), history);
        Self { config, preferences, meals, recommender, event_tx }
    }

    /// In-memory stores, empty meal list.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryPreferenceRepository::new()),
            Arc::new(InMemoryMealRepository::new()),
        )
    }

    /// Build the stores named by the configuration.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let meals: Arc<dyn MealRepository> = match &config.storage.meals_seed_path {
            Some(path) => Arc::new(InMemoryMealRepository::load_json(path).await?),
            None => Arc::new(InMemoryMealRepository::new()),
        };

        let preferences: Arc<dyn PreferenceRepository> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryPreferenceRepository::new()),
            StorageBackend::Postgres => connect_postgres(&config).await?,
        };

        info!(backend = ?config.storage.backend, "Storage initialised");
        Ok(Self::new(config, preferences, meals))
    }

    /// Publish an event. Having no subscribers is fine.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(config: &Config) -> anyhow::Result<Arc<dyn PreferenceRepository>> {
    let url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for the postgres backend"))?;
    let repo = tabletalk_db::PgPreferenceRepository::connect(url, config.storage.max_connections).await?;
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_config: &Config) -> anyhow::Result<Arc<dyn PreferenceRepository>> {
    anyhow::bail!("this build has no PostgreSQL support; rebuild with --features postgres")
}

pub type SharedState = Arc<AppState>;
