//! HTTP API integration tests.
//!
//! Starts an axum server per test and exercises it with reqwest.

#![cfg(feature = "http")]

mod support;
mod dealers;
mod reviews;
