//! Shared fixtures and server bootstrap for the API tests.

use std::sync::Arc;

use dealer_api::http::{self, SharedStore};
use dealer_api::{Collection, DocumentStore, InMemoryStore, Record, RecordStore, StoreError};
use serde_json::{json, Value};

fn records(value: Value) -> Vec<Record> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

pub fn dealerships() -> Vec<Record> {
    records(json!([
        { "id": 1, "state": "NY", "full_name": "Empire Motors" },
        { "id": 2, "state": "CA", "full_name": "Golden Autos" },
        { "id": 3, "state": "NY", "full_name": "Hudson Cars" },
    ]))
}

pub fn reviews() -> Vec<Record> {
    records(json!([
        { "id": 1, "dealership": 1, "name": "Ann", "review": "Quick and friendly" },
        { "id": 2, "dealership": 3, "name": "Bo", "review": "Pushy sales team" },
    ]))
}

pub fn cars() -> Vec<Record> {
    records(json!([
        { "dealer_id": 1, "make": "Audi", "model": "A6" },
        { "dealer_id": 2, "make": "Kia", "model": "Soul" },
        { "dealer_id": 1, "make": "VW", "model": "Golf" },
    ]))
}

pub fn memory_store() -> SharedStore {
    Arc::new(
        InMemoryStore::new()
            .with_records(Collection::Dealerships, dealerships())
            .with_records(Collection::Reviews, reviews())
            .with_records(Collection::Inventory, cars()),
    )
}

pub fn document_store() -> SharedStore {
    let store = DocumentStore::in_memory().unwrap();
    store.insert_many(Collection::Dealerships, dealerships()).unwrap();
    store.insert_many(Collection::Reviews, reviews()).unwrap();
    store.insert_many(Collection::Inventory, cars()).unwrap();
    Arc::new(store)
}

/// Both backends, so every route test runs against each.
pub fn backends() -> Vec<(&'static str, SharedStore)> {
    vec![("memory", memory_store()), ("document", document_store())]
}

/// A store whose storage layer always fails.
pub struct FailingStore;

fn down<T>() -> Result<T, StoreError> {
    Err(StoreError::Storage("connection refused".into()))
}

impl RecordStore for FailingStore {
    fn list_all(&self, _: Collection) -> Result<Vec<Record>, StoreError> {
        down()
    }

    fn list_where(&self, _: Collection, _: &str, _: &Value) -> Result<Vec<Record>, StoreError> {
        down()
    }

    fn find_one_by_id(&self, _: Collection, _: i64) -> Result<Option<Record>, StoreError> {
        down()
    }

    fn insert(&self, _: Collection, _: Record) -> Result<Record, StoreError> {
        down()
    }

    fn insert_many(&self, _: Collection, _: Vec<Record>) -> Result<usize, StoreError> {
        down()
    }

    fn count(&self, _: Collection) -> Result<usize, StoreError> {
        down()
    }
}

/// Bind to port 0 and return the base URL.
pub async fn start_server(store: SharedStore) -> String {
    let app = http::router(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn get_json(url: String) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}
