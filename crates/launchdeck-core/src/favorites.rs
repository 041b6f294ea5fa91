//! Favorite sets per collection.
//!
//! Favorites are kept as a JSON array of ids under the collection's storage
//! key in an injected [`KeyValueStore`]. Ids are unique and listed in the
//! order they were added. Writers in other processes are not coordinated:
//! the last write wins.

use std::sync::Arc;

use crate::entity::Entity;
use crate::error::Result;
use crate::page::PageSequence;

/// Durable string key-value storage.
///
/// Implementations report `LaunchdeckError::StorageUnavailable` when the
/// backing storage cannot be used at all.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Favorite ids per collection, persisted on every mutation.
///
/// The `try_*` methods surface storage errors. The plain methods degrade
/// instead: reads fall back to an empty list and failed writes are logged
/// and dropped, so a missing storage never breaks the caller.
#[derive(Debug, Clone)]
pub struct FavoritesStore<S> {
    store: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ============================================================================
    // Fallible operations
    // ============================================================================

    /// Ids favorited in `collection`, in insertion order.
    pub fn try_get_all(&self, collection: &str) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(collection)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<String> = serde_json::from_str(&raw)?;

        // Another writer may have left duplicates behind; keep first occurrences.
        let mut ids: Vec<String> = Vec::with_capacity(stored.len());
        for id in stored {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Appends `id` unless already present. Returns whether it was added.
    pub fn try_add(&self, collection: &str, id: &str) -> Result<bool> {
        let mut ids = self.try_get_all(collection)?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        self.write(collection, &ids)?;
        Ok(true)
    }

    /// Removes every occurrence of `id`. Returns whether anything was removed.
    pub fn try_remove(&self, collection: &str, id: &str) -> Result<bool> {
        let mut ids = self.try_get_all(collection)?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() == before {
            return Ok(false);
        }
        self.write(collection, &ids)?;
        Ok(true)
    }

    /// Forgets every favorite of `collection`.
    pub fn try_clear(&self, collection: &str) -> Result<()> {
        self.store.remove(collection)
    }

    fn write(&self, collection: &str, ids: &[String]) -> Result<()> {
        let raw = serde_json::to_string(ids)?;
        self.store.set(collection, &raw)?;
        tracing::debug!(collection, count = ids.len(), "Favorites saved");
        Ok(())
    }

    // ============================================================================
    // Degrading operations
    // ============================================================================

    /// Ids favorited in `collection`; empty when none or storage is unusable.
    pub fn get_all(&self, collection: &str) -> Vec<String> {
        self.try_get_all(collection).unwrap_or_else(|err| {
            tracing::warn!(collection, "Failed to read favorites: {}", err);
            Vec::new()
        })
    }

    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.get_all(collection).iter().any(|existing| existing == id)
    }

    /// Adds `id` to the favorites of `collection` (no-op when present).
    pub fn add(&self, collection: &str, id: &str) -> bool {
        self.try_add(collection, id).unwrap_or_else(|err| {
            tracing::warn!(collection, id, "Failed to add favorite: {}", err);
            false
        })
    }

    /// Removes `id` from the favorites of `collection` (no-op when absent).
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        self.try_remove(collection, id).unwrap_or_else(|err| {
            tracing::warn!(collection, id, "Failed to remove favorite: {}", err);
            false
        })
    }

    /// Adds `id` when absent, removes it when present. Returns whether `id`
    /// is a favorite afterwards.
    pub fn toggle(&self, collection: &str, id: &str) -> bool {
        if self.contains(collection, id) {
            self.remove(collection, id);
        } else {
            self.add(collection, id);
        }
        self.contains(collection, id)
    }

    pub fn clear(&self, collection: &str) {
        if let Err(err) = self.try_clear(collection) {
            tracing::warn!(collection, "Failed to clear favorites: {}", err);
        }
    }
}

/// Loaded docs whose id is among `favorite_ids`, in page order.
pub fn favorite_docs<'a, T: Entity>(
    pages: &'a PageSequence<T>,
    favorite_ids: &[String],
) -> Vec<&'a T> {
    pages
        .docs()
        .filter(|doc| favorite_ids.iter().any(|id| id == doc.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LaunchdeckError;
    use crate::entity::{Launch, Named};
    use crate::page::Page;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock KeyValueStore for testing
    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, String>>,
        writes: Mutex<usize>,
        unavailable: bool,
    }

    impl MockStore {
        fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }

    impl KeyValueStore for MockStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.unavailable {
                return Err(LaunchdeckError::storage_unavailable("mock"));
            }
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.unavailable {
                return Err(LaunchdeckError::storage_unavailable("mock"));
            }
            *self.writes.lock().unwrap() += 1;
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            if self.unavailable {
                return Err(LaunchdeckError::storage_unavailable("mock"));
            }
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_get_all_of_unknown_collection_is_empty() {
        let favorites = FavoritesStore::new(MockStore::default());
        assert!(favorites.get_all("launches").is_empty());
    }

    #[test]
    fn test_add_twice_keeps_single_entry() {
        let favorites = FavoritesStore::new(MockStore::default());
        assert!(favorites.add("launches", "abc"));
        assert!(!favorites.add("launches", "abc"));

        assert_eq!(favorites.get_all("launches"), vec!["abc"]);
        assert_eq!(favorites.store().writes(), 1);
    }

    #[test]
    fn test_add_add_remove_scenario() {
        let favorites = FavoritesStore::new(MockStore::default());
        favorites.add("launches", "abc");
        favorites.add("launches", "xyz");
        favorites.remove("launches", "abc");

        assert_eq!(favorites.get_all("launches"), vec!["xyz"]);
    }

    #[test]
    fn test_remove_absent_id_leaves_list_unchanged() {
        let favorites = FavoritesStore::new(MockStore::default());
        favorites.add("launch-pads", "pad-1");
        let writes = favorites.store().writes();

        assert!(!favorites.remove("launch-pads", "pad-2"));
        assert_eq!(favorites.get_all("launch-pads"), vec!["pad-1"]);
        assert_eq!(favorites.store().writes(), writes);
    }

    #[test]
    fn test_remove_drops_every_occurrence() {
        let store = MockStore::default();
        store.set("launches", r#"["a","b","a"]"#).unwrap();
        let favorites = FavoritesStore::new(store);

        assert_eq!(favorites.get_all("launches"), vec!["a", "b"]);
        assert!(favorites.remove("launches", "a"));
        assert_eq!(
            favorites.store().get("launches").unwrap().as_deref(),
            Some(r#"["b"]"#)
        );
    }

    #[test]
    fn test_collections_are_independent() {
        let favorites = FavoritesStore::new(MockStore::default());
        favorites.add("launches", "same-id");
        assert!(favorites.contains("launches", "same-id"));
        assert!(!favorites.contains("launch-pads", "same-id"));
    }

    #[test]
    fn test_toggle_and_clear() {
        let favorites = FavoritesStore::new(MockStore::default());
        assert!(favorites.toggle("launches", "abc"));
        assert!(!favorites.toggle("launches", "abc"));
        assert!(favorites.toggle("launches", "abc"));

        favorites.clear("launches");
        assert!(favorites.get_all("launches").is_empty());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_empty() {
        let favorites = FavoritesStore::new(MockStore::unavailable());

        assert!(!favorites.add("launches", "abc"));
        assert!(!favorites.remove("launches", "abc"));
        assert!(favorites.get_all("launches").is_empty());
        favorites.clear("launches");

        assert!(
            favorites
                .try_get_all("launches")
                .unwrap_err()
                .is_storage_unavailable()
        );
    }

    #[test]
    fn test_corrupted_value_is_not_overwritten() {
        let store = MockStore::default();
        store.set("launches", "not json").unwrap();
        let favorites = FavoritesStore::new(store);

        assert!(favorites.get_all("launches").is_empty());
        assert!(!favorites.add("launches", "abc"));
        assert_eq!(
            favorites.store().get("launches").unwrap().as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn test_favorite_docs_filters_loaded_pages() {
        let launches: Vec<Launch> = ["a", "b", "c"]
            .iter()
            .map(|id| serde_json::from_value(serde_json::json!({ "id": id })).unwrap())
            .collect();
        let mut pages = PageSequence::new();
        pages.push(Page::new(launches, 0, 3, false));

        let favorites = vec!["c".to_string(), "a".to_string(), "zzz".to_string()];
        let docs: Vec<&str> = favorite_docs(&pages, &favorites)
            .into_iter()
            .map(|launch| launch.id())
            .collect();
        assert_eq!(docs, vec!["a", "c"]);
    }
}
