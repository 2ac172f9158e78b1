//! Fixture files: the static JSON that initializes and seeds collections.
//!
//! Each fixture is a JSON object with one named array, e.g.
//! `{ "dealerships": [ { "id": 1, "state": "NY", ... } ] }`.
//! Loading never panics or aborts; the outcome is handed back to the caller,
//! which decides whether to degrade the collection to empty.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::record::{Collection, Record};

/// Why a fixture could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// The file could not be read.
    Io { path: PathBuf, message: String },
    /// The file was read but is not a valid fixture document.
    Malformed { path: PathBuf, message: String },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::Io { path, message } => {
                write!(f, "cannot read fixture {}: {}", path.display(), message)
            }
            FixtureError::Malformed { path, message } => {
                write!(f, "malformed fixture {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for FixtureError {}

/// Outcome of loading one collection's fixture.
#[derive(Debug, Clone)]
pub struct FixtureLoad {
    pub collection: Collection,
    pub outcome: Result<Vec<Record>, FixtureError>,
}

/// A directory holding `dealerships.json`, `reviews.json` and `car_records.json`.
#[derive(Debug, Clone)]
pub struct FixtureDir {
    root: PathBuf,
}

impl FixtureDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the fixture file for a collection.
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.fixture_file())
    }

    pub fn load(&self, collection: Collection) -> Result<Vec<Record>, FixtureError> {
        load_fixture(&self.path_for(collection), collection)
    }

    /// Load every collection's fixture, one outcome per collection.
    pub fn load_all(&self) -> Vec<FixtureLoad> {
        Collection::ALL
            .iter()
            .map(|&collection| FixtureLoad {
                collection,
                outcome: self.load(collection),
            })
            .collect()
    }
}

/// Read and parse a single fixture file.
pub fn load_fixture(path: &Path, collection: Collection) -> Result<Vec<Record>, FixtureError> {
    let raw = fs::read_to_string(path).map_err(|e| FixtureError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_fixture(&raw, collection).map_err(|message| FixtureError::Malformed {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_fixture(raw: &str, collection: Collection) -> Result<Vec<Record>, String> {
    let mut document: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let key = collection.fixture_key();
    let items = match document.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(format!("field `{}` is not an array", key)),
        None => return Err(format!("missing array field `{}`", key)),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(format!("{}[{}] is not an object", key, index)),
        })
        .collect()
}
