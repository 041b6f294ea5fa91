pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::LaunchdeckPaths;
pub use crate::storage::{FileKeyValueStore, MemoryStore, SharedFavoritesStore, open_favorites};
