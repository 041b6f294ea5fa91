//! Detail-view lookups: one record by id and a launch pad's recent launches.

use std::sync::Arc;

use launchdeck_core::error::Result;
use launchdeck_core::{
    Collection, Entity, Launch, LaunchdeckError, QueryDescriptor, QueryFetcher, SortOrder,
};

/// Single-record and related-record lookups for detail views.
pub struct EntityLookup<F> {
    fetcher: Arc<F>,
}

impl<F: QueryFetcher> EntityLookup<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    /// Fetches the record with the given id, embedding the `populate` paths.
    ///
    /// Returns [`LaunchdeckError::NotFound`] when the query matches nothing.
    pub async fn find<T: Entity>(&self, id: &str, populate: &[&str]) -> Result<T> {
        let descriptor = populate
            .iter()
            .fold(QueryDescriptor::by_id(T::COLLECTION, id), |descriptor, path| {
                descriptor.with_populate(*path)
            });

        let page = self.fetcher.fetch_page::<T>(&descriptor).await?;
        page.docs
            .into_iter()
            .next()
            .ok_or_else(|| LaunchdeckError::not_found(T::COLLECTION.entity_name(), id))
    }

    /// The `limit` most recent past launches from one launch pad.
    pub async fn recent_launches(&self, launch_pad_id: &str, limit: u64) -> Result<Vec<Launch>> {
        let descriptor = QueryDescriptor::new(Collection::Launches)
            .with_filter("upcoming", false)
            .with_filter("launchpad", launch_pad_id)
            .with_limit(limit)
            .sorted_by("date_utc", SortOrder::Desc);

        let page = self.fetcher.fetch_page::<Launch>(&descriptor).await?;
        tracing::debug!(
            "Found {} recent launches for launch pad {}",
            page.docs.len(),
            launch_pad_id
        );
        Ok(page.docs)
    }
}
