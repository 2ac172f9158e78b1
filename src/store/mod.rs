//! Record stores - one data-access contract, two backends.
//!
//! Route handlers only ever see `dyn RecordStore`, so the same handlers serve
//! the in-memory fixture data and the SQLite document store.
//!
//! ## Example
//!
//! ```ignore
//! use dealer_api::{Collection, InMemoryStore, RecordStore};
//! use serde_json::json;
//!
//! let store = InMemoryStore::new();
//! let review = json!({ "dealership": 3, "review": "Great service" });
//! let stored = store.insert(Collection::Reviews, review.as_object().unwrap().clone())?;
//! assert_eq!(stored["id"], 1);
//! ```

mod document;
mod in_memory;

use std::fmt;

use serde_json::Value;

use crate::record::{Collection, Record};

/// Data access over the three record collections.
///
/// "Nothing matched" is always an empty result or `None`; `Err` is reserved
/// for failures of the storage layer itself.
pub trait RecordStore: Send + Sync {
    /// Every record in the collection, in a stable order.
    fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError>;

    /// Records whose `field` equals `value` (see [`crate::field_matches`]).
    fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError>;

    /// The record whose id field equals `id`, if any.
    fn find_one_by_id(
        &self,
        collection: Collection,
        id: i64,
    ) -> Result<Option<Record>, StoreError>;

    /// Insert a single record and return it as stored.
    ///
    /// Collections that assign ids (reviews) overwrite any supplied `id` with
    /// the next free one; assignment and append happen atomically.
    fn insert(&self, collection: Collection, record: Record) -> Result<Record, StoreError>;

    /// Bulk insert records verbatim. Returns the number inserted.
    fn insert_many(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<usize, StoreError>;

    /// Number of records currently in the collection.
    fn count(&self, collection: Collection) -> Result<usize, StoreError>;
}

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An in-process lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// The backing database failed (connection, query or write).
    Storage(String),
    /// A stored document could not be encoded or decoded.
    Serde(String),
    /// A query named a field the store refuses to address.
    InvalidField(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Storage(msg) => write!(f, "storage error: {}", msg),
            StoreError::Serde(msg) => write!(f, "record serialization error: {}", msg),
            StoreError::InvalidField(field) => write!(f, "invalid query field: {}", field),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Stamp `id = max_id + 1` onto a record of an id-assigning collection.
pub(crate) fn assign_id(
    collection: Collection,
    record: &mut Record,
    max_id: Option<i64>,
) -> Result<(), StoreError> {
    let next = max_id
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| StoreError::Storage(format!("{} id space exhausted", collection)))?;
    record.insert(collection.id_field().to_string(), Value::from(next));
    Ok(())
}

pub use document::DocumentStore;
pub use in_memory::InMemoryStore;
