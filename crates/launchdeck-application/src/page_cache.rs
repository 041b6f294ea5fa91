//! Memo of fetched pages shared between controllers.

use launchdeck_core::{FamilyKey, Page};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Families kept by [`PageCache::new`].
pub const DEFAULT_MAX_FAMILIES: usize = 16;

struct CacheState<T> {
    pages: HashMap<(FamilyKey, u64), Arc<Page<T>>>,
    /// Cached families, least recently used first.
    recent: VecDeque<FamilyKey>,
}

impl<T> CacheState<T> {
    fn touch(&mut self, family: &FamilyKey) {
        if let Some(pos) = self.recent.iter().position(|key| key == family) {
            if let Some(key) = self.recent.remove(pos) {
                self.recent.push_back(key);
            }
        }
    }

    fn forget(&mut self, family: &FamilyKey) -> usize {
        self.recent.retain(|key| key != family);
        let before = self.pages.len();
        self.pages.retain(|(key, _), _| key != family);
        before - self.pages.len()
    }
}

/// In-memory memo of fetched pages.
///
/// Pages are keyed by query family and offset, so returning to a family that
/// was loaded before does not hit the network again. At most `max_families`
/// families are kept; caching a new one evicts the least recently used.
pub struct PageCache<T> {
    max_families: usize,
    state: Arc<Mutex<CacheState<T>>>,
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self::with_max_families(DEFAULT_MAX_FAMILIES)
    }

    /// Creates a cache holding the pages of at most `max_families` families
    /// (at least one).
    pub fn with_max_families(max_families: usize) -> Self {
        Self {
            max_families: max_families.max(1),
            state: Arc::new(Mutex::new(CacheState {
                pages: HashMap::new(),
                recent: VecDeque::new(),
            })),
        }
    }

    pub fn max_families(&self) -> usize {
        self.max_families
    }

    /// Gets a cached page.
    ///
    /// # Returns
    ///
    /// `Some(page)` if the page at `offset` of `family` is cached, `None` otherwise.
    pub async fn get(&self, family: &FamilyKey, offset: u64) -> Option<Arc<Page<T>>> {
        let mut state = self.state.lock().await;
        let page = state.pages.get(&(family.clone(), offset)).cloned()?;
        state.touch(family);
        Some(page)
    }

    pub async fn insert(&self, family: FamilyKey, offset: u64, page: Arc<Page<T>>) {
        let mut state = self.state.lock().await;
        if state.recent.contains(&family) {
            state.touch(&family);
        } else {
            while state.recent.len() >= self.max_families {
                let Some(evicted) = state.recent.front().cloned() else {
                    break;
                };
                let dropped = state.forget(&evicted);
                tracing::debug!("Evicted {} cached pages of {}", dropped, evicted);
            }
            state.recent.push_back(family.clone());
        }
        state.pages.insert((family, offset), page);
    }

    /// Removes every page of one family. Returns how many were dropped.
    pub async fn remove_family(&self, family: &FamilyKey) -> usize {
        self.state.lock().await.forget(family)
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.pages.clear();
        state.recent.clear();
    }

    /// Number of cached pages.
    pub async fn len(&self) -> usize {
        self.state.lock().await.pages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.pages.is_empty()
    }

    pub async fn family_count(&self) -> usize {
        self.state.lock().await.recent.len()
    }
}

impl<T> Clone for PageCache<T> {
    fn clone(&self) -> Self {
        Self {
            max_families: self.max_families,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchdeck_core::{Collection, QueryDescriptor};

    fn search_family(name: &str) -> FamilyKey {
        QueryDescriptor::new(Collection::Launches)
            .with_filter("name", name)
            .family_key()
    }

    #[tokio::test]
    async fn test_get_insert_remove_family() {
        let cache: PageCache<u32> = PageCache::new();
        let launches = QueryDescriptor::past_launches(12).family_key();
        let pads = QueryDescriptor::launch_pads(12).family_key();

        cache
            .insert(launches.clone(), 0, Arc::new(Page::new(vec![1, 2], 0, 2, true)))
            .await;
        cache
            .insert(launches.clone(), 2, Arc::new(Page::new(vec![3], 2, 2, false)))
            .await;
        cache
            .insert(pads.clone(), 0, Arc::new(Page::new(vec![9], 0, 12, false)))
            .await;

        assert_eq!(cache.get(&launches, 2).await.unwrap().docs, vec![3]);
        assert!(cache.get(&launches, 4).await.is_none());
        assert_eq!(cache.family_count().await, 2);

        assert_eq!(cache.remove_family(&launches).await, 2);
        assert!(cache.get(&launches, 0).await.is_none());
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.family_count().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.family_count().await, 0);
    }

    #[tokio::test]
    async fn test_evicts_least_recently_used_family() {
        let cache: PageCache<u32> = PageCache::with_max_families(2);
        assert_eq!(cache.max_families(), 2);
        let (a, b, c) = (search_family("a"), search_family("b"), search_family("c"));

        cache.insert(a.clone(), 0, Arc::new(Page::new(vec![1], 0, 1, true))).await;
        cache.insert(a.clone(), 1, Arc::new(Page::new(vec![2], 1, 1, false))).await;
        cache.insert(b.clone(), 0, Arc::new(Page::new(vec![3], 0, 1, false))).await;

        // Reading `a` makes `b` the least recently used family.
        assert!(cache.get(&a, 0).await.is_some());
        cache.insert(c.clone(), 0, Arc::new(Page::new(vec![4], 0, 1, false))).await;

        assert_eq!(cache.family_count().await, 2);
        assert!(cache.get(&b, 0).await.is_none());
        assert_eq!(cache.get(&a, 1).await.unwrap().docs, vec![2]);
        assert_eq!(cache.get(&c, 0).await.unwrap().docs, vec![4]);
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test]
    async fn test_switching_through_many_families_stays_bounded() {
        let cache: PageCache<u32> = PageCache::new();
        for i in 0..(DEFAULT_MAX_FAMILIES * 3) {
            let family = search_family(&format!("query-{i}"));
            cache.insert(family, 0, Arc::new(Page::new(vec![1], 0, 1, true))).await;
        }
        assert_eq!(cache.family_count().await, DEFAULT_MAX_FAMILIES);
        assert_eq!(cache.len().await, DEFAULT_MAX_FAMILIES);
    }
}
