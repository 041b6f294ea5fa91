//! Unified path management for launchdeck files.
//!
//! ```text
//! ~/.config/launchdeck/          # Config directory
//! └── config.toml                # Application configuration
//!
//! ~/.local/share/launchdeck/     # Data directory
//! └── favorites/                 # One JSON file per collection
//!     ├── launches.json
//!     └── launch-pads.json
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "launchdeck";

/// A platform directory the OS does not report.
#[derive(Debug, thiserror::Error)]
#[error("Cannot find {0} directory")]
pub struct PathError(&'static str);

impl From<PathError> for launchdeck_core::LaunchdeckError {
    fn from(err: PathError) -> Self {
        launchdeck_core::LaunchdeckError::config(err.to_string())
    }
}

/// Platform paths of launchdeck (XDG on Linux, the native locations elsewhere).
pub struct LaunchdeckPaths;

impl LaunchdeckPaths {
    /// e.g. `~/.config/launchdeck/`
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError("config"))
    }

    /// e.g. `~/.local/share/launchdeck/`
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError("data"))
    }

    /// `config.toml` inside [`Self::config_dir`].
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default favorites directory.
    pub fn favorites_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("favorites"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_app_dir() {
        if let Ok(config_file) = LaunchdeckPaths::config_file() {
            assert!(config_file.ends_with("launchdeck/config.toml"));
        }
        if let Ok(favorites_dir) = LaunchdeckPaths::favorites_dir() {
            assert!(favorites_dir.ends_with("launchdeck/favorites"));
        }
    }
}
