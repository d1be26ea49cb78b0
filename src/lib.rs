//! Blazegate: a small REST gateway for Blazegraph.
//!
//! Creates namespaces, reports which namespaces exist, probes SPARQL
//! endpoints, and forwards uploaded Turtle files to an ingestion endpoint
//! while keeping a record of every upload.

pub mod blazegraph;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod logging;
pub mod uploads;

pub use config::Config;
pub use gateway::{build_router, AppState};
