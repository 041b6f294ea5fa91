//! Key-value storage backends for favorites.

mod atomic_file;
mod file_store;
mod memory_store;

use std::path::Path;
use std::sync::Arc;

use launchdeck_core::favorites::{FavoritesStore, KeyValueStore};

pub use atomic_file::{AtomicFile, AtomicFileError};
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryStore;

/// Favorites over a type-erased store.
pub type SharedFavoritesStore = FavoritesStore<Arc<dyn KeyValueStore>>;

/// Opens the favorites store rooted at `dir`.
///
/// When durable storage is unavailable the favorites live in memory for the
/// rest of the process instead of failing the caller.
pub fn open_favorites(dir: &Path) -> SharedFavoritesStore {
    let store: Arc<dyn KeyValueStore> = match FileKeyValueStore::open(dir) {
        Ok(store) => {
            tracing::debug!("Favorites stored in {}", store.dir().display());
            Arc::new(store)
        }
        Err(err) => {
            tracing::warn!("Favorites will not be persisted: {}", err);
            Arc::new(MemoryStore::new())
        }
    };
    FavoritesStore::new(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_favorites_falls_back_to_memory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("favorites");
        std::fs::write(&blocker, "not a directory").unwrap();

        let favorites = open_favorites(&blocker);
        favorites.add("launches", "abc");
        assert_eq!(favorites.get_all("launches"), vec!["abc"]);
    }

    #[test]
    fn test_open_favorites_persists() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("favorites");

        open_favorites(&dir).add("launches", "abc");
        assert_eq!(open_favorites(&dir).get_all("launches"), vec!["abc"]);
    }
}
