//! Domain layer for launchdeck.
//!
//! Holds the entity models served by the SpaceX v4 query API, the query
//! descriptor and page types, the pure derivations used by the controllers
//! (`derive_next_offset`, `derive_filtered_view`) and the traits the outer
//! layers implement (`QueryFetcher`, `KeyValueStore`).

pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod favorites;
pub mod page;
pub mod query;
pub mod search;

// Re-export common error type
pub use error::LaunchdeckError;

pub use collection::Collection;
pub use entity::{Entity, Launch, LaunchPad, Named, Reference, Rocket};
pub use page::{Page, PageSequence, derive_next_offset};
pub use query::{FamilyKey, QueryDescriptor, QueryFetcher, QueryOptions, SortOrder};
