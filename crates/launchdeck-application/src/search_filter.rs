//! Debounced incremental search over loaded pages.
//!
//! The raw query follows every keystroke; the effective query trails it by
//! the debounce delay and is what the filtered view is derived from.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use launchdeck_core::PageSequence;
use launchdeck_core::search::{SearchProjection, derive_filtered_view_with};
use tokio::sync::watch;

use crate::debounce::Debouncer;

/// Holds the raw and the debounced effective search query.
#[derive(Debug)]
pub struct SearchFilter {
    raw: Mutex<String>,
    effective: Arc<watch::Sender<String>>,
    debouncer: Debouncer,
}

impl SearchFilter {
    pub fn new(delay: Duration) -> Self {
        let (effective, _) = watch::channel(String::new());
        Self {
            raw: Mutex::new(String::new()),
            effective: Arc::new(effective),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Records the raw query and restarts the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&self, raw: impl Into<String>) {
        let raw = raw.into();
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = raw.clone();

        let effective = Arc::clone(&self.effective);
        self.debouncer.call(move || publish(&effective, raw));
    }

    /// Publishes the raw query immediately, skipping the remaining delay.
    pub fn flush(&self) {
        self.debouncer.cancel();
        publish(&self.effective, self.raw_query());
    }

    pub fn raw_query(&self) -> String {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn effective_query(&self) -> String {
        self.effective.borrow().clone()
    }

    /// Receives the effective query each time it changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.effective.subscribe()
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new(crate::debounce::DEFAULT_DEBOUNCE)
    }
}

fn publish(effective: &watch::Sender<String>, query: String) {
    effective.send_if_modified(|current| {
        if *current == query {
            return false;
        }
        tracing::debug!("Effective search query: {:?}", query);
        *current = query;
        true
    });
}

/// Memoised filtered view over one page sequence.
///
/// Recomputes only when the effective query or the sequence revision
/// changed since the previous call.
#[derive(Debug)]
pub struct FilteredView<T> {
    projection: SearchProjection<T>,
    key: Option<(String, u64)>,
    matches: Vec<T>,
    recomputations: usize,
}

impl<T: launchdeck_core::Entity> FilteredView<T> {
    pub fn new() -> Self {
        Self::with_projection(SearchProjection::default())
    }
}

impl<T: launchdeck_core::Entity> Default for FilteredView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FilteredView<T> {
    pub fn with_projection(projection: SearchProjection<T>) -> Self {
        Self {
            projection,
            key: None,
            matches: Vec::new(),
            recomputations: 0,
        }
    }

    /// Loaded docs matching `effective_query`.
    pub fn view(&mut self, pages: &PageSequence<T>, effective_query: &str) -> &[T] {
        let unchanged = self
            .key
            .as_ref()
            .is_some_and(|(query, revision)| query == effective_query && *revision == pages.revision());

        if !unchanged {
            self.matches = derive_filtered_view_with(pages, effective_query, &self.projection)
                .into_iter()
                .cloned()
                .collect();
            self.key = Some((effective_query.to_string(), pages.revision()));
            self.recomputations += 1;
        }
        &self.matches
    }

    /// How many times the view was derived.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchdeck_core::{Launch, Page};
    use serde_json::json;
    use std::borrow::Cow;

    fn launch(id: &str, name: &str, rocket: &str) -> Launch {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "rocket": {"id": format!("rocket-{id}"), "name": rocket},
        }))
        .unwrap()
    }

    fn sequence() -> PageSequence<Launch> {
        let mut pages = PageSequence::new();
        pages.push(Page::new(
            vec![
                launch("1", "FalconSat", "Falcon 1"),
                launch("2", "Starlink-15", "Falcon 9"),
                launch("3", "Crew-1", "Falcon 9"),
            ],
            0,
            3,
            true,
        ));
        pages
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_recomputes_once() {
        let filter = SearchFilter::default();
        let mut effective = filter.subscribe();
        let pages = sequence();
        let mut view = FilteredView::new();

        assert_eq!(view.view(&pages, &effective.borrow_and_update()).len(), 3);
        assert_eq!(view.recomputations(), 1);

        for raw in ["F", "Fa", "Fal"] {
            filter.set_query(raw);
            assert_eq!(filter.raw_query(), raw);
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(filter.effective_query(), "");
        assert!(!effective.has_changed().unwrap());

        effective.changed().await.unwrap();
        let query = effective.borrow_and_update().clone();
        assert_eq!(query, "Fal");

        let names: Vec<_> = view.view(&pages, &query).iter().map(|l| l.name.clone()).collect();
        assert_eq!(names, vec!["FalconSat", "Starlink-15", "Crew-1"]);
        assert_eq!(view.recomputations(), 2);

        view.view(&pages, &query);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!effective.has_changed().unwrap());
        assert_eq!(view.recomputations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_effective_query_is_not_republished() {
        let filter = SearchFilter::new(Duration::from_millis(100));
        let mut effective = filter.subscribe();

        filter.set_query("crew");
        effective.changed().await.unwrap();
        effective.borrow_and_update();

        filter.set_query("crew");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!effective.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_flush_publishes_immediately() {
        let filter = SearchFilter::default();
        filter.set_query("starlink");
        filter.flush();
        assert_eq!(filter.effective_query(), "starlink");
    }

    #[test]
    fn test_view_recomputes_on_new_page() {
        let mut pages = sequence();
        let mut view = FilteredView::new();

        assert_eq!(view.view(&pages, "crew").len(), 1);
        assert_eq!(view.view(&pages, "crew").len(), 1);
        assert_eq!(view.recomputations(), 1);

        pages.push(Page::new(vec![launch("4", "Crew-2", "Falcon 9")], 3, 3, false));
        assert_eq!(view.view(&pages, "crew").len(), 2);
        assert_eq!(view.recomputations(), 2);
    }

    fn rocket_only(launch: &Launch) -> Vec<Cow<'_, str>> {
        launch.rocket_name().map(Cow::Borrowed).into_iter().collect()
    }

    #[test]
    fn test_custom_projection() {
        let pages = sequence();
        let mut view = FilteredView::with_projection(SearchProjection::new(rocket_only));
        assert_eq!(view.view(&pages, "falcon 9").len(), 2);
        assert!(view.view(&pages, "crew").is_empty());
    }
}
