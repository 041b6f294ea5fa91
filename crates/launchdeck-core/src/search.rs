//! Client-side incremental search over loaded pages.
//!
//! Matching is a case-insensitive substring test of the query against the
//! projected string fields of each entity. It only ever looks at pages that
//! are already loaded.

use std::borrow::Cow;

use crate::entity::Entity;
use crate::page::PageSequence;

/// Selects the string fields of `T` that the search matches against.
pub struct SearchProjection<T> {
    project: for<'a> fn(&'a T) -> Vec<Cow<'a, str>>,
}

impl<T> Clone for SearchProjection<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SearchProjection<T> {}

impl<T> std::fmt::Debug for SearchProjection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchProjection").finish_non_exhaustive()
    }
}

impl<T> SearchProjection<T> {
    /// Uses a custom field projection.
    pub fn new(project: for<'a> fn(&'a T) -> Vec<Cow<'a, str>>) -> Self {
        Self { project }
    }

    /// True when any projected field contains `upper_query`.
    ///
    /// `upper_query` must already be upper-cased (see [`normalize_query`]).
    pub fn matches(&self, entity: &T, upper_query: &str) -> bool {
        upper_query.is_empty()
            || (self.project)(entity)
                .iter()
                .any(|field| field.to_uppercase().contains(upper_query))
    }
}

impl<T: Entity> Default for SearchProjection<T> {
    fn default() -> Self {
        Self::new(T::search_fields)
    }
}

/// Case-folds a query once so it can be matched against many entities.
pub fn normalize_query(query: &str) -> String {
    query.to_uppercase()
}

/// Filters every loaded doc by the effective query using the entity's own
/// search fields. An empty query keeps everything.
pub fn derive_filtered_view<'a, T: Entity>(
    pages: &'a PageSequence<T>,
    effective_query: &str,
) -> Vec<&'a T> {
    derive_filtered_view_with(pages, effective_query, &SearchProjection::default())
}

/// Same as [`derive_filtered_view`] with an explicit projection.
pub fn derive_filtered_view_with<'a, T>(
    pages: &'a PageSequence<T>,
    effective_query: &str,
    projection: &SearchProjection<T>,
) -> Vec<&'a T> {
    let upper_query = normalize_query(effective_query);
    pages
        .docs()
        .filter(|entity| projection.matches(entity, &upper_query))
        .collect()
}
