//! Loads [`LaunchdeckConfig`] from `~/.config/launchdeck/config.toml`, applies
//! environment overrides and caches the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use launchdeck_core::LaunchdeckError;
use launchdeck_core::config::LaunchdeckConfig;
use launchdeck_core::error::Result;

use crate::paths::LaunchdeckPaths;

/// Overrides `api.base_url`.
pub const API_URL_ENV: &str = "SPACEX_API_URL";

/// Loads the configuration once and hands out clones of it.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file; the platform config file when `None`.
    path: Option<PathBuf>,
    cached: Arc<RwLock<Option<LaunchdeckConfig>>>,
}

impl ConfigService {
    /// Reads the platform config file.
    pub fn new() -> Self {
        Self::from_source(None)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::from_source(Some(path.into()))
    }

    fn from_source(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cached: Arc::default(),
        }
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn get_config(&self) -> Result<LaunchdeckConfig> {
        if let Some(cached) = self.read_cache()? {
            return Ok(cached);
        }

        let path = match &self.path {
            Some(path) => path.clone(),
            None => LaunchdeckPaths::config_file()?,
        };
        let mut loaded = Self::load_file(&path)?;
        apply_env_overrides(&mut loaded, |name| std::env::var(name).ok());

        *self.cached.write().map_err(poisoned)? = Some(loaded.clone());

        Ok(loaded)
    }

    /// Drops the cached value; the next [`Self::get_config`] reads the file again.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cached) = self.cached.write() {
            cached.take();
        }
    }

    fn read_cache(&self) -> Result<Option<LaunchdeckConfig>> {
        Ok(self.cached.read().map_err(poisoned)?.clone())
    }

    fn load_file(path: &Path) -> Result<LaunchdeckConfig> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Ok(LaunchdeckConfig::default());
            }
            Err(e) => {
                return Err(LaunchdeckError::config(format!(
                    "Failed to read config file at {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        toml::from_str(&content).map_err(|e| {
            LaunchdeckError::config(format!(
                "Failed to parse config file at {}: {}",
                path.display(),
                e
            ))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> LaunchdeckError {
    LaunchdeckError::internal(format!("Config cache poisoned: {}", err))
}

/// Applies environment overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut LaunchdeckConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
        tracing::debug!("Using {} override: {}", API_URL_ENV, base_url);
        config.api.base_url = base_url;
    }
}
