//! Server configuration, from command-line flags with environment fallbacks.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which record store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Backend {
    /// Fixtures loaded into memory at start; inserts are lost on exit.
    Memory,
    /// SQLite document store, seeded from fixtures when empty.
    Document,
}

/// Dealer API server.
#[derive(Parser, Debug)]
#[command(name = "dealer-api", version, about)]
pub(crate) struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3030)]
    pub port: u16,
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Record store backend.
    #[arg(long, env = "DEALER_BACKEND", value_enum, default_value_t = Backend::Memory)]
    pub backend: Backend,
    /// Document store location (document backend only).
    #[arg(long, env = "DATABASE_PATH", default_value = "dealership_db.sqlite")]
    pub database: PathBuf,
    /// Directory holding dealerships.json, reviews.json and car_records.json.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
