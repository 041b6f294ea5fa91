pub mod browse;
pub mod favorites;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use launchdeck_core::config::LaunchdeckConfig;
use launchdeck_core::favorites::{FavoritesStore, KeyValueStore};
use launchdeck_infrastructure::{
    ConfigService, LaunchdeckPaths, MemoryStore, SharedFavoritesStore, open_favorites,
};
use launchdeck_interaction::SpaceXClient;

/// Everything a command needs: resolved configuration, the API client and
/// the favorites store.
pub struct AppContext {
    pub config: LaunchdeckConfig,
    pub client: Arc<SpaceXClient>,
    pub favorites: SharedFavoritesStore,
}

impl AppContext {
    /// Resolves configuration (file, then environment, then flags) and
    /// builds the shared services.
    pub fn load(config_path: Option<PathBuf>, api_url: Option<String>) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let mut config = service
            .get_config()
            .context("Failed to load configuration")?;
        if let Some(api_url) = api_url {
            config.api.base_url = api_url;
        }

        let client = SpaceXClient::from_config(&config.api).context("Failed to create API client")?;
        let favorites = favorites_store(&config);

        Ok(Self {
            config,
            client: Arc::new(client),
            favorites,
        })
    }
}

fn favorites_store(config: &LaunchdeckConfig) -> SharedFavoritesStore {
    if let Some(dir) = &config.storage.favorites_path {
        return open_favorites(dir);
    }
    match LaunchdeckPaths::favorites_dir() {
        Ok(dir) => open_favorites(&dir),
        Err(err) => {
            tracing::warn!("Favorites will not be persisted: {}", err);
            let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
            FavoritesStore::new(store)
        }
    }
}
