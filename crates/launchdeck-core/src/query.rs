//! Query descriptors and the fetcher trait.
//!
//! A [`QueryDescriptor`] is what the query API receives: a MongoDB-style
//! filter plus pagination/sort/populate options. Descriptors that differ only
//! by `offset` belong to the same query family, identified by a
//! [`FamilyKey`].

use std::fmt;

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::Result;
use crate::page::Page;

/// Sort direction of one sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Options half of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// Sort fields in priority order; serialized as a JSON object.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_sort"
    )]
    pub sort: Vec<(String, SortOrder)>,

    /// Reference paths to embed in the returned docs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub populate: Vec<String>,
}

fn serialize_sort<S>(sort: &[(String, SortOrder)], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(sort.len()))?;
    for (field, order) in sort {
        map.serialize_entry(field, order)?;
    }
    map.end()
}

/// A query against one collection.
///
/// Serializes to the exact request body: `{"query": <filter>, "options": {..}}`.
/// The collection is not part of the body; it selects the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    #[serde(skip)]
    pub collection: Collection,

    #[serde(rename = "query")]
    pub filter: Map<String, Value>,

    pub options: QueryOptions,
}

impl QueryDescriptor {
    /// Creates an unfiltered query with default options.
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filter: Map::new(),
            options: QueryOptions::default(),
        }
    }

    /// Past launches, newest first, with rocket and launch pad populated.
    pub fn past_launches(page_size: u64) -> Self {
        Self::new(Collection::Launches)
            .with_filter("upcoming", false)
            .with_limit(page_size)
            .with_populate("rocket")
            .with_populate("launchpad")
            .sorted_by("date_utc", SortOrder::Desc)
    }

    /// Launch pads ordered by full name, with their rockets populated.
    pub fn launch_pads(page_size: u64) -> Self {
        Self::new(Collection::LaunchPads)
            .with_filter("upcoming", false)
            .with_limit(page_size)
            .with_populate("rockets")
            .sorted_by("full_name", SortOrder::Asc)
    }

    /// Single-entity lookup: `filter._id = id`, `limit = 1`.
    pub fn by_id(collection: Collection, id: impl Into<String>) -> Self {
        Self::new(collection)
            .with_filter("_id", id.into())
            .with_limit(1)
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn with_populate(mut self, path: impl Into<String>) -> Self {
        self.options.populate.push(path.into());
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.options.sort.push((field.into(), order));
        self
    }

    /// Returns a copy of this descriptor requesting the given offset.
    pub fn with_offset(&self, offset: u64) -> Self {
        let mut descriptor = self.clone();
        descriptor.options.offset = Some(offset);
        descriptor
    }

    /// Returns a copy with the offset removed: the base of the query family.
    pub fn base(&self) -> Self {
        let mut descriptor = self.clone();
        descriptor.options.offset = None;
        descriptor
    }

    /// Identity of the query family this descriptor belongs to.
    pub fn family_key(&self) -> FamilyKey {
        let base = self.base();
        // serde_json maps are key-sorted, so equal families render equally.
        let body = serde_json::to_string(&base).unwrap_or_else(|err| {
            tracing::warn!("Falling back to debug family key: {}", err);
            format!("{:?}|{:?}", base.filter, base.options)
        });
        FamilyKey(format!("{}:{}", self.collection.endpoint(), body))
    }

    /// True when both descriptors differ at most by `offset`.
    pub fn same_family(&self, other: &Self) -> bool {
        self.collection == other.collection
            && self.filter == other.filter
            && QueryOptions {
                offset: None,
                ..self.options.clone()
            } == QueryOptions {
                offset: None,
                ..other.options.clone()
            }
    }

    /// The request body sent to the query endpoint.
    pub fn to_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Identity of a query family: collection, filter and options minus offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyKey(String);

impl FamilyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetches one page of a query from the remote query API.
///
/// Implementations issue exactly one request per call, do not retry and do
/// not cache; memoisation belongs to the caller.
#[async_trait]
pub trait QueryFetcher: Send + Sync {
    async fn fetch_page<T: Entity>(&self, descriptor: &QueryDescriptor) -> Result<Page<T>>;
}
