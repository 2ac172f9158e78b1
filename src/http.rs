//! HTTP transport - maps the dealer API routes onto a `RecordStore`.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /` - liveness, lists the available endpoints.
//! - `GET /fetchDealers` and `GET /fetchDealers/:state`
//! - `GET /fetchDealer/:id` - 404 when absent.
//! - `GET /fetchReviews/dealer/:id`
//! - `POST /insert_review` - body is a free-form review object.
//! - `GET /fetchInventory/dealer/:id`
//!
//! An id segment that is not an integer matches nothing: 404 for the single
//! dealer route, `[]` for the list routes.
//!
//! Every error body is `{ "error": message }`. Not-found is 404; every other
//! failure is 500.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dealer_api::{http, InMemoryStore};
//!
//! let app = http::router(Arc::new(InMemoryStore::new()));
//! // or serve directly
//! http::serve(Arc::new(InMemoryStore::new()), "0.0.0.0:3030").await?;
//! ```

use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::record::{coerce_integer_field, Collection, Record};
use crate::store::{RecordStore, StoreError};

/// Store handle shared by every request.
pub type SharedStore = Arc<dyn RecordStore>;

/// Endpoints advertised by the liveness route.
pub const ENDPOINTS: [&str; 6] = [
    "GET /fetchDealers",
    "GET /fetchDealers/:state",
    "GET /fetchDealer/:id",
    "GET /fetchReviews/dealer/:id",
    "POST /insert_review",
    "GET /fetchInventory/dealer/:id",
];

/// Body of the liveness route.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub endpoints: &'static [&'static str],
}

/// Body returned by a successful review insert.
#[derive(Debug, Serialize)]
pub struct InsertReviewResponse {
    pub success: bool,
    pub review: Record,
}

/// Error type for route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The requested record does not exist.
    NotFound(String),
    /// The review body could not be decoded or coerced.
    InvalidPayload(String),
    /// The store failed; `context` is the message shown to the client.
    Store {
        context: &'static str,
        source: StoreError,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => f.write_str(msg),
            ApiError::InvalidPayload(msg) => f.write_str(msg),
            ApiError::Store { context, .. } => f.write_str(context),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ApiError {
    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidPayload(_) | ApiError::Store { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store { context, source } = &self {
            tracing::error!(error = %source, "{}", context);
        }
        let body = json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Build an axum `Router` serving the dealer API from the given store.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/fetchDealers", get(fetch_dealers))
        .route("/fetchDealers/:state", get(fetch_dealers_by_state))
        .route("/fetchDealer/:id", get(fetch_dealer))
        .route("/fetchReviews/dealer/:id", get(fetch_dealer_reviews))
        .route("/insert_review", post(insert_review))
        .route("/fetchInventory/dealer/:id", get(fetch_dealer_inventory))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Serve the API over HTTP at the given address (e.g. `"0.0.0.0:3030"`).
pub async fn serve(store: SharedStore, addr: &str) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "dealer API listening");
    axum::serve(listener, app).await
}

/// Run a store call off the async workers so slow storage never stalls
/// unrelated requests.
async fn with_store<T, F>(store: &SharedStore, context: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn RecordStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| StoreError::Storage(format!("store task failed: {}", e)))
        .and_then(|result| result)
        .map_err(|source| ApiError::Store { context, source })
}

/// Integer id from a path segment. `None` is a lookup miss, not an error.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// `GET /`
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Dealer API Server is running",
        endpoints: &ENDPOINTS,
    })
}

/// `GET /fetchDealers`
async fn fetch_dealers(State(store): State<SharedStore>) -> Result<Json<Vec<Record>>, ApiError> {
    let dealers = with_store(&store, "Failed to fetch dealers", |s| {
        s.list_all(Collection::Dealerships)
    })
    .await?;
    Ok(Json(dealers))
}

/// `GET /fetchDealers/:state`
async fn fetch_dealers_by_state(
    State(store): State<SharedStore>,
    Path(state): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let dealers = with_store(&store, "Failed to fetch dealers by state", move |s| {
        s.list_where(Collection::Dealerships, "state", &Value::String(state))
    })
    .await?;
    Ok(Json(dealers))
}

/// `GET /fetchDealer/:id`
async fn fetch_dealer(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let not_found = || ApiError::NotFound("Dealer not found".into());
    let id = parse_id(&id).ok_or_else(not_found)?;
    with_store(&store, "Failed to fetch dealer", move |s| {
        s.find_one_by_id(Collection::Dealerships, id)
    })
    .await?
    .map(Json)
    .ok_or_else(not_found)
}

/// `GET /fetchReviews/dealer/:id`
async fn fetch_dealer_reviews(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Vec::new()));
    };
    let reviews = with_store(&store, "Failed to fetch reviews", move |s| {
        s.list_where(Collection::Reviews, "dealership", &Value::from(id))
    })
    .await?;
    Ok(Json(reviews))
}

/// `POST /insert_review`
async fn insert_review(
    State(store): State<SharedStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InsertReviewResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;
    let Value::Object(mut review) = body else {
        return Err(ApiError::InvalidPayload(
            "review payload must be a JSON object".into(),
        ));
    };
    coerce_integer_field(&mut review, "dealership").map_err(ApiError::InvalidPayload)?;

    let stored = with_store(&store, "Failed to insert review", move |s| {
        s.insert(Collection::Reviews, review)
    })
    .await?;
    tracing::info!(id = ?stored.get("id"), dealership = ?stored.get("dealership"), "review inserted");
    Ok(Json(InsertReviewResponse {
        success: true,
        review: stored,
    }))
}

/// `GET /fetchInventory/dealer/:id`
async fn fetch_dealer_inventory(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Vec::new()));
    };
    let cars = with_store(&store, "Failed to fetch inventory", move |s| {
        s.list_where(Collection::Inventory, "dealer_id", &Value::from(id))
    })
    .await?;
    Ok(Json(cars))
}

async fn unknown_route() -> ApiError {
    ApiError::NotFound("Not found".into())
}
