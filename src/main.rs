//! Dealer API server - composition root.
//!
//! Picks a record store backend, initializes it from the fixture directory,
//! and serves the HTTP routes.

mod config;

use std::sync::Arc;

use clap::Parser;
use dealer_api::http::{self, SharedStore};
use dealer_api::{seed, DocumentStore, FixtureDir, InMemoryStore, SeedOutcome};
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, ServerConfig};

fn memory_store(fixtures: &FixtureDir) -> SharedStore {
    let (store, loads) = InMemoryStore::from_fixtures(fixtures);
    for load in loads {
        match load.outcome {
            Ok(records) => {
                tracing::info!(collection = %load.collection, count = records.len(), "fixture loaded")
            }
            Err(e) => tracing::error!(
                collection = %load.collection,
                error = %e,
                "fixture load failed, serving collection empty"
            ),
        }
    }
    Arc::new(store)
}

fn document_store(cfg: &ServerConfig, fixtures: &FixtureDir) -> Result<SharedStore, String> {
    let store = DocumentStore::open(&cfg.database)
        .map_err(|e| format!("cannot open {}: {}", cfg.database.display(), e))?;
    tracing::info!(path = %cfg.database.display(), "document store opened");

    let report = seed(&store, fixtures);
    for (collection, outcome) in &report.outcomes {
        match outcome {
            SeedOutcome::Failed { reason } => {
                tracing::error!(%collection, %reason, "seeding failed")
            }
            other => tracing::info!(%collection, outcome = %other, "seeding"),
        }
    }
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cfg = ServerConfig::parse();
    let fixtures = FixtureDir::new(&cfg.data_dir);

    let store = match cfg.backend {
        Backend::Memory => memory_store(&fixtures),
        Backend::Document => document_store(&cfg, &fixtures)?,
    };

    http::serve(store, &cfg.listen_addr()).await?;
    Ok(())
}
