//! Application layer: controllers that drive the query API on behalf of a
//! consumer (pagination, debounced search, detail lookups).

pub mod debounce;
pub mod entity_lookup;
pub mod page_cache;
pub mod paginated_query;
pub mod search_filter;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use entity_lookup::EntityLookup;
pub use page_cache::{DEFAULT_MAX_FAMILIES, PageCache};
pub use paginated_query::{LoadMoreState, LoadOutcome, LoadStatus, PaginatedQuery};
pub use search_filter::{FilteredView, SearchFilter};
