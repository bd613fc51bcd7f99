//! Collection abstractions shared by every record type.
//!
//! A collection is a remote, keyword-searchable, offset-paginated list of
//! records. The view engine only talks to collections through
//! [`CollectionSource`], which keeps it independent of the transport.

pub mod memory;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AtriumError, Result};
use crate::view::QueryParameters;

pub use memory::{MemoryRecord, MemorySource};

/// Stable identifier of a record, as assigned by the remote.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = AtriumError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i32>()
            .map(RecordId)
            .map_err(|_| AtriumError::Validation(format!("invalid record id '{s}'")))
    }
}

/// Singular and plural display names of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityNames {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl EntityNames {
    /// Singular name with the first letter upper-cased ("Customer").
    pub fn title(&self) -> String {
        let mut chars = self.singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// An entity owned by the remote data source.
///
/// The engine never mutates records; it renders them and forwards their ids.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    const NAMES: EntityNames;

    fn id(&self) -> RecordId;

    /// Human-readable label used in prompts ("Are you sure to delete ...").
    fn label(&self) -> String;
}

/// One page of a keyword-filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionResult<R> {
    pub items: Vec<R>,
    /// Count of all records matching the keyword, ignoring paging
    pub total_count: u64,
}

impl<R> CollectionResult<R> {
    pub fn new(items: Vec<R>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Remote collection of one record type, plus its write operations.
#[async_trait]
pub trait CollectionSource: Send + Sync + 'static {
    type Record: Record;
    /// Payload for create and update
    type Draft: Clone + fmt::Debug + Send + Sync + 'static;

    /// Fetch one page of records matching `params.keyword`.
    async fn fetch(&self, params: &QueryParameters) -> Result<CollectionResult<Self::Record>>;

    async fn create(&self, draft: Self::Draft) -> Result<Self::Record>;

    async fn update(&self, id: RecordId, draft: Self::Draft) -> Result<Self::Record>;

    /// Delete a record, returning its last canonical representation.
    async fn delete(&self, id: RecordId) -> Result<Self::Record>;
}
