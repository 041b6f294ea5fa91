//! Offset-paginated loading of one query family.
//!
//! [`PaginatedQuery`] owns the page sequence of the current query family and
//! appends pages strictly in offset order. `load_more` calls for the same
//! family and offset share one request, even across a switch to another
//! family and back, and a response that arrives after the query changed is
//! dropped instead of being appended to the new family.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use launchdeck_core::error::Result;
use launchdeck_core::{Entity, FamilyKey, Page, PageSequence, QueryDescriptor, QueryFetcher};

use crate::page_cache::PageCache;

type PageLoad<T> = Shared<BoxFuture<'static, Result<Arc<Page<T>>>>>;

/// Where the controller is in its load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Nothing requested yet for the current family.
    Idle,
    /// Page number `page` (offset `offset`) is being fetched.
    Loading { page: usize, offset: u64 },
    /// The last request succeeded.
    Loaded,
    /// The last request failed; previously loaded pages are kept.
    Error(launchdeck_core::LaunchdeckError),
}

/// Result of one `load_more` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended.
    Appended { offset: u64, docs: usize },
    /// The last page reports no further data; nothing was requested.
    Exhausted,
    /// The query changed while the request was in flight.
    Stale,
    /// Another caller already appended this page.
    AlreadyLoaded,
}

/// State of a "load more" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreState {
    ShowMore,
    Loading,
    ReachedEnd,
}

impl LoadMoreState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadMoreState::ShowMore => "Show more...",
            LoadMoreState::Loading => "Loading...",
            LoadMoreState::ReachedEnd => "That's all!",
        }
    }

    /// Whether the control accepts input.
    pub fn is_enabled(&self) -> bool {
        matches!(self, LoadMoreState::ShowMore)
    }
}

impl fmt::Display for LoadMoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct QueryState<T> {
    descriptor: QueryDescriptor,
    family: FamilyKey,
    pages: PageSequence<T>,
    status: LoadStatus,
    /// Pending loads of any family; kept when the family changes.
    in_flight: HashMap<(FamilyKey, u64), PageLoad<T>>,
}

impl<T> QueryState<T> {
    fn reset(&mut self) {
        self.pages.clear();
        self.status = LoadStatus::Idle;
    }
}

/// Paginated loader for one query family at a time.
///
/// State lives behind a `std::sync::Mutex` that is never held across an
/// await, so accessors are synchronous and return owned snapshots.
pub struct PaginatedQuery<T, F> {
    fetcher: Arc<F>,
    cache: PageCache<T>,
    state: Mutex<QueryState<T>>,
}

impl<T, F> PaginatedQuery<T, F>
where
    T: Entity,
    F: QueryFetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, descriptor: QueryDescriptor) -> Self {
        Self::with_cache(fetcher, descriptor, PageCache::new())
    }

    /// Creates a controller sharing an existing page cache.
    pub fn with_cache(fetcher: Arc<F>, descriptor: QueryDescriptor, cache: PageCache<T>) -> Self {
        let descriptor = descriptor.base();
        let family = descriptor.family_key();
        Self {
            fetcher,
            cache,
            state: Mutex::new(QueryState {
                descriptor,
                family,
                pages: PageSequence::new(),
                status: LoadStatus::Idle,
                in_flight: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueryState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the base query.
    ///
    /// A different family discards every loaded page and returns `true`;
    /// the next `load_more` starts again at offset 0. A descriptor of the
    /// current family changes nothing.
    pub fn set_query(&self, descriptor: QueryDescriptor) -> bool {
        let family = descriptor.family_key();
        let mut state = self.lock();
        if state.family == family {
            return false;
        }

        tracing::debug!("Query family changed to {}", family);
        state.descriptor = descriptor.base();
        state.family = family;
        state.reset();
        true
    }

    /// Requests the page following the loaded ones.
    ///
    /// Errors are returned to the caller and recorded in [`LoadStatus::Error`];
    /// pages loaded before the failure stay in place.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let (family, offset, load) = {
            let mut state = self.lock();
            let Some(offset) = state.pages.next_offset() else {
                return Ok(LoadOutcome::Exhausted);
            };
            let family = state.family.clone();
            let key = (family.clone(), offset);

            let load = match state.in_flight.get(&key) {
                Some(pending) => {
                    tracing::debug!("Joining in-flight load of {} at offset {}", family, offset);
                    pending.clone()
                }
                None => {
                    let load = fetch_through_cache(
                        Arc::clone(&self.fetcher),
                        self.cache.clone(),
                        state.descriptor.with_offset(offset),
                        family.clone(),
                        offset,
                    )
                    .boxed()
                    .shared();
                    state.in_flight.insert(key, load.clone());
                    load
                }
            };

            state.status = LoadStatus::Loading {
                page: state.pages.len(),
                offset,
            };
            (family, offset, load)
        };

        let result = load.clone().await;

        let mut state = self.lock();
        let key = (family.clone(), offset);
        if state
            .in_flight
            .get(&key)
            .is_some_and(|pending| pending.ptr_eq(&load))
        {
            state.in_flight.remove(&key);
        }

        if state.family != family {
            tracing::warn!(
                "Discarding response for {} at offset {}: query changed",
                family,
                offset
            );
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Err(err) => {
                tracing::warn!("Loading offset {} of {} failed: {}", offset, family, err);
                if state.pages.next_offset() == Some(offset) {
                    state.status = LoadStatus::Error(err.clone());
                }
                Err(err)
            }
            Ok(page) => {
                if state.pages.next_offset() != Some(offset) {
                    tracing::debug!("Offset {} of {} already appended", offset, family);
                    return Ok(LoadOutcome::AlreadyLoaded);
                }

                let docs = page.docs.len();
                state.pages.push(Page::clone(&page));
                state.status = LoadStatus::Loaded;
                tracing::info!(
                    "Appended {} docs at offset {} ({} pages loaded)",
                    docs,
                    offset,
                    state.pages.len()
                );
                Ok(LoadOutcome::Appended { offset, docs })
            }
        }
    }

    /// Loads pages until `count` are loaded or the query is exhausted.
    ///
    /// Returns the number of pages loaded afterwards.
    pub async fn ensure_pages(&self, count: usize) -> Result<usize> {
        while self.page_count() < count {
            match self.load_more().await? {
                LoadOutcome::Appended { .. } | LoadOutcome::AlreadyLoaded => {}
                LoadOutcome::Exhausted | LoadOutcome::Stale => break,
            }
        }
        Ok(self.page_count())
    }

    /// Drops the cached pages of the current family and reloads as many
    /// pages as were loaded before.
    pub async fn revalidate(&self) -> Result<usize> {
        let (family, count) = {
            let state = self.lock();
            (state.family.clone(), state.pages.len())
        };

        let dropped = self.cache.remove_family(&family).await;
        tracing::debug!("Revalidating {}: dropped {} cached pages", family, dropped);

        {
            let mut state = self.lock();
            if state.family != family {
                return Ok(state.pages.len());
            }
            state.reset();
            state.in_flight.retain(|(pending, _), _| pending != &family);
        }

        self.ensure_pages(count).await
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        self.lock().descriptor.clone()
    }

    pub fn family_key(&self) -> FamilyKey {
        self.lock().family.clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().status.clone()
    }

    /// Snapshot of the loaded pages.
    pub fn pages(&self) -> Vec<Page<T>> {
        self.lock().pages.pages().to_vec()
    }

    /// Snapshot of the page sequence, revision included.
    pub fn page_sequence(&self) -> PageSequence<T> {
        self.lock().pages.clone()
    }

    /// Every loaded doc merged in page order.
    pub fn docs(&self) -> Vec<T> {
        self.lock().pages.merged()
    }

    pub fn page_count(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().status, LoadStatus::Loading { .. })
    }

    /// True once a page was loaded and the last one reports no further data.
    pub fn is_reaching_end(&self) -> bool {
        self.lock()
            .pages
            .last()
            .is_some_and(|page| !page.has_next_page)
    }

    pub fn load_more_state(&self) -> LoadMoreState {
        if self.is_loading() {
            LoadMoreState::Loading
        } else if self.is_reaching_end() {
            LoadMoreState::ReachedEnd
        } else {
            LoadMoreState::ShowMore
        }
    }

    pub fn cache(&self) -> &PageCache<T> {
        &self.cache
    }
}

async fn fetch_through_cache<T, F>(
    fetcher: Arc<F>,
    cache: PageCache<T>,
    descriptor: QueryDescriptor,
    family: FamilyKey,
    offset: u64,
) -> Result<Arc<Page<T>>>
where
    T: Entity,
    F: QueryFetcher,
{
    if let Some(page) = cache.get(&family, offset).await {
        tracing::debug!("Page cache hit for {} at offset {}", family, offset);
        return Ok(page);
    }

    let page = Arc::new(fetcher.fetch_page::<T>(&descriptor).await?);
    cache.insert(family, offset, Arc::clone(&page)).await;
    Ok(page)
}
