//! DocumentStore - persistent record store over SQLite JSON documents.
//!
//! Each collection is one table of JSON documents:
//!
//! ```text
//! CREATE TABLE dealerships (seq INTEGER PRIMARY KEY AUTOINCREMENT, doc TEXT NOT NULL)
//! ```
//!
//! Equality queries go through `json_extract`, which keeps JSON types intact:
//! the number `3` never matches the string `"3"`.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::Value;

use super::{assign_id, RecordStore, StoreError};
use crate::record::{Collection, Record};

/// SQLite-backed document store.
///
/// The connection is guarded by a mutex, so every operation (including id
/// assignment plus append) is a single critical section.
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    /// Open (or create) a store at `path` and ensure every collection exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        for collection in Collection::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    doc TEXT NOT NULL
                );",
                table = collection.name()
            ))?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))?;
        f(&mut *conn)
    }

    fn query_docs(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Record>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let docs = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        docs.iter().map(|doc| decode(doc)).collect()
    }
}

fn decode(doc: &str) -> Result<Record, StoreError> {
    Ok(serde_json::from_str(doc)?)
}

/// JSON path for a top-level field. Only plain identifiers are addressable.
fn json_path(field: &str) -> Result<String, StoreError> {
    let plain = !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Ok(format!("$.{}", field))
    } else {
        Err(StoreError::InvalidField(field.to_string()))
    }
}

/// SQL value that `json_extract` yields for an equal JSON scalar.
/// `None` means the value can never match (null, arrays, objects).
fn sql_scalar(value: &Value) -> Option<SqlValue> {
    match value {
        Value::String(s) => Some(SqlValue::Text(s.clone())),
        Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(SqlValue::Integer(i)),
            None => n.as_f64().map(SqlValue::Real),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn insert_doc(tx: &Transaction<'_>, collection: Collection, record: &Record) -> Result<(), StoreError> {
    let doc = serde_json::to_string(record)?;
    tx.execute(
        &format!("INSERT INTO {} (doc) VALUES (?1)", collection.name()),
        params![doc],
    )?;
    Ok(())
}

impl RecordStore for DocumentStore {
    fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        self.with_conn("list_all", |conn| {
            Self::query_docs(
                conn,
                &format!("SELECT doc FROM {} ORDER BY seq", collection.name()),
                params![],
            )
        })
    }

    fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError> {
        let path = json_path(field)?;
        let Some(scalar) = sql_scalar(value) else {
            return Ok(Vec::new());
        };
        self.with_conn("list_where", |conn| {
            Self::query_docs(
                conn,
                &format!(
                    "SELECT doc FROM {} WHERE json_extract(doc, ?1) = ?2 ORDER BY seq",
                    collection.name()
                ),
                params![path, scalar],
            )
        })
    }

    fn find_one_by_id(
        &self,
        collection: Collection,
        id: i64,
    ) -> Result<Option<Record>, StoreError> {
        let path = json_path(collection.id_field())?;
        self.with_conn("find_one_by_id", |conn| {
            let doc: Option<String> = conn
                .query_row(
                    &format!(
                        "SELECT doc FROM {} WHERE json_extract(doc, ?1) = ?2 ORDER BY seq LIMIT 1",
                        collection.name()
                    ),
                    params![path, id],
                    |row| row.get(0),
                )
                .optional()?;
            doc.as_deref().map(decode).transpose()
        })
    }

    fn insert(&self, collection: Collection, mut record: Record) -> Result<Record, StoreError> {
        self.with_conn("insert", |conn| {
            let tx = conn.transaction()?;
            if collection.assigns_ids() {
                let path = json_path(collection.id_field())?;
                let max_id: Option<i64> = tx.query_row(
                    &format!(
                        "SELECT MAX(json_extract(doc, ?1)) FROM {} \
                         WHERE json_type(doc, ?1) = 'integer'",
                        collection.name()
                    ),
                    params![path],
                    |row| row.get(0),
                )?;
                assign_id(collection, &mut record, max_id)?;
            }
            insert_doc(&tx, collection, &record)?;
            tx.commit()?;
            Ok(record)
        })
    }

    fn insert_many(
        &self,
        collection: Collection,
        records: Vec<Record>,
    ) -> Result<usize, StoreError> {
        self.with_conn("insert_many", |conn| {
            let tx = conn.transaction()?;
            for record in &records {
                insert_doc(&tx, collection, record)?;
            }
            tx.commit()?;
            Ok(records.len())
        })
    }

    fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        self.with_conn("count", |conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", collection.name()),
                [],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
    }
}
