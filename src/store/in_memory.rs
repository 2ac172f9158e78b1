//! InMemoryStore - fixture-loaded record store held in process memory.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::{assign_id, RecordStore, StoreError};
use crate::fixtures::{FixtureDir, FixtureLoad};
use crate::record::{field_matches, record_id, Collection, Record};

/// In-memory record store backed by one `Vec` per collection.
///
/// Clone-friendly via Arc; clones share the same collections.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Record>>>>,
}

impl InMemoryStore {
    /// Create a store with every collection empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: replace a collection's contents.
    pub fn with_records(self, collection: Collection, records: Vec<Record>) -> Self {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection, records);
        self
    }

    /// Load every collection from its fixture file.
    ///
    /// A fixture that fails to load leaves its collection empty. The returned
    /// loads carry the failures so the caller can report them.
    pub fn from_fixtures(dir: &FixtureDir) -> (Self, Vec<FixtureLoad>) {
        let loads = dir.load_all();
        let mut collections = HashMap::new();
        for load in &loads {
            let records = load.outcome.as_ref().cloned().unwrap_or_default();
            collections.insert(load.collection, records);
        }
        let store = Self {
            collections: Arc::new(RwLock::new(collections)),
        };
        (store, loads)
    }

    fn read_collection<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&[Record]) -> T,
    ) -> Result<T, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        let records = collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(f(records))
    }
}

impl RecordStore for InMemoryStore {
    fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        self.read_collection(collection, <[Record]>::to_vec)
    }

    fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError> {
        self.read_collection(collection, |records| {
            records
                .iter()
                .filter(|r| field_matches(r, field, value))
                .cloned()
                .collect()
        })
    }

    fn find_one_by_id(
        &self,
        collection: Collection,
        id: i64,
    ) -> Result<Option<Record>, StoreError> {
        let id = Value::from(id);
        self.read_collection(collection, |records| {
            records
                .iter()
                .find(|r| field_matches(r, collection.id_field(), &id))
                .cloned()
        })
    }

    fn insert(&self, collection: Collection, mut record: Record) -> Result<Record, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let records = collections.entry(collection).or_default();

        if collection.assigns_ids() {
            let max_id = records.iter().filter_map(|r| record_id(r, collection)).max();
            assign_id(collection, &mut record, max_id)?;
        }

        records.push(record.clone());
        Ok(record)
    }

    fn insert_many(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<usize, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let inserted = records.len();
        collections.entry(collection).or_default().extend(records);
        Ok(inserted)
    }

    fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        self.read_collection(collection, <[Record]>::len)
    }
}
