//! Pages and page sequences.

use serde::{Deserialize, Serialize};

/// One fetched batch of entities plus pagination metadata.
///
/// Deserializes from the paginated response of the query API; metadata the
/// API adds beyond `docs`/`offset`/`limit`/`hasNextPage` is kept when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_docs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a page without the optional totals.
    pub fn new(docs: Vec<T>, offset: u64, limit: u64, has_next_page: bool) -> Self {
        Self {
            docs,
            offset,
            limit,
            has_next_page,
            total_docs: None,
            total_pages: None,
            page: None,
        }
    }
}

/// Offset of the page that follows `pages`.
///
/// - `Some(0)` when nothing is loaded yet.
/// - `Some(last.offset + last.limit)` while the last page reports more data.
/// - `None` once the last page reports `hasNextPage = false`.
pub fn derive_next_offset<T>(pages: &[Page<T>]) -> Option<u64> {
    match pages.last() {
        None => Some(0),
        Some(last) if last.has_next_page => Some(last.offset + last.limit),
        Some(_) => None,
    }
}

/// The ordered, append-only pages of one query family.
///
/// Index is the page number. Every mutation bumps `revision`, which derived
/// views compare against to decide whether to recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSequence<T> {
    pages: Vec<Page<T>>,
    revision: u64,
}

impl<T> Default for PageSequence<T> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            revision: 0,
        }
    }
}

impl<T> PageSequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next page.
    pub fn push(&mut self, page: Page<T>) {
        self.pages.push(page);
        self.revision += 1;
    }

    /// Discards every page (reset to a new base query).
    pub fn clear(&mut self) {
        self.pages.clear();
        self.revision += 1;
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn last(&self) -> Option<&Page<T>> {
        self.pages.last()
    }

    /// Number of pages loaded.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// See [`derive_next_offset`].
    pub fn next_offset(&self) -> Option<u64> {
        derive_next_offset(&self.pages)
    }

    /// False once the last loaded page reports no further data.
    pub fn has_next_page(&self) -> bool {
        self.next_offset().is_some()
    }

    /// All docs of all pages, in page order.
    pub fn docs(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.docs.iter())
    }

    /// Total number of docs loaded.
    pub fn doc_count(&self) -> usize {
        self.pages.iter().map(|page| page.docs.len()).sum()
    }
}

impl<T: Clone> PageSequence<T> {
    /// All docs of all pages merged into one list.
    pub fn merged(&self) -> Vec<T> {
        self.docs().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(offset: u64, limit: u64, docs: usize, has_next_page: bool) -> Page<u32> {
        Page::new((0..docs as u32).collect(), offset, limit, has_next_page)
    }

    #[test]
    fn test_next_offset_of_empty_sequence_is_zero() {
        let pages: Vec<Page<u32>> = Vec::new();
        assert_eq!(derive_next_offset(&pages), Some(0));
    }

    #[test]
    fn test_next_offset_continues_from_last_page() {
        let pages = vec![page(0, 12, 12, true), page(12, 12, 12, true)];
        assert_eq!(derive_next_offset(&pages), Some(24));
    }

    #[test]
    fn test_next_offset_is_none_after_last_page() {
        let pages = vec![page(0, 12, 12, true), page(12, 12, 5, false)];
        assert_eq!(derive_next_offset(&pages), None);
    }

    #[test]
    fn test_sequence_tracks_revision_and_docs() {
        let mut sequence = PageSequence::new();
        assert_eq!(sequence.revision(), 0);
        assert!(sequence.has_next_page());

        sequence.push(page(0, 12, 12, true));
        sequence.push(page(12, 12, 5, false));

        assert_eq!(sequence.revision(), 2);
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.doc_count(), 17);
        assert_eq!(sequence.merged().len(), 17);
        assert!(!sequence.has_next_page());

        sequence.clear();
        assert!(sequence.is_empty());
        assert_eq!(sequence.revision(), 3);
        assert_eq!(sequence.next_offset(), Some(0));
    }

    #[test]
    fn test_page_from_api_response() {
        let page: Page<serde_json::Value> = serde_json::from_value(json!({
            "docs": [{ "id": "a" }],
            "totalDocs": 187,
            "offset": 0,
            "limit": 12,
            "totalPages": 16,
            "page": 1,
            "pagingCounter": 1,
            "hasPrevPage": false,
            "hasNextPage": true,
            "prevPage": null,
            "nextPage": 2
        }))
        .unwrap();

        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.limit, 12);
        assert!(page.has_next_page);
        assert_eq!(page.total_docs, Some(187));
        assert_eq!(page.total_pages, Some(16));
    }
}
