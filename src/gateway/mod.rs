//! REST API in front of Blazegraph and the upload record store.

pub mod dto;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::blazegraph::{http_client, BlazegraphClient};
use crate::config::{Config, ServerConfig};
use crate::ingest::TurtleIngestor;
use crate::uploads::{FileMetadataStore, SqliteFileStore};

pub use error::ApiError;

/// Handles shared by every request. Nothing here is mutated per request
/// except the record store, which does its own locking.
#[derive(Clone)]
pub struct AppState {
    pub blazegraph: Arc<BlazegraphClient>,
    pub ingestor: Arc<TurtleIngestor>,
    pub files: Arc<dyn FileMetadataStore>,
}

impl AppState {
    pub fn new(
        blazegraph: BlazegraphClient,
        ingestor: TurtleIngestor,
        files: Arc<dyn FileMetadataStore>,
    ) -> Self {
        Self {
            blazegraph: Arc::new(blazegraph),
            ingestor: Arc::new(ingestor),
            files,
        }
    }

    /// Wire up clients and the SQLite store from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(&config.blazegraph).context("Failed to build HTTP client")?;
        let db_path = config.storage.resolved_database_path();
        let store = SqliteFileStore::open(&db_path)
            .with_context(|| format!("Failed to open record store {}", db_path.display()))?;
        tracing::info!(path = %db_path.display(), "Opened upload record store");

        Ok(Self::new(
            BlazegraphClient::new(http.clone(), &config.blazegraph),
            TurtleIngestor::new(http, &config.ingest),
            Arc::new(store),
        ))
    }
}

/// Build the API router. Unsupported methods on a known path get a JSON 405.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    use handlers::*;

    Router::new()
        .route("/", get(homepage).fallback(method_not_allowed))
        .route("/files", get(list_files).fallback(method_not_allowed))
        .route("/database", post(create_database).fallback(method_not_allowed))
        .route("/namespace", post(create_namespace).fallback(method_not_allowed))
        .route("/upload", post(upload_turtle_file).fallback(method_not_allowed))
        .route("/connect", post(connect_database).fallback(method_not_allowed))
        .route("/active-database", get(active_database).fallback(method_not_allowed))
        .route("/active-repository", get(active_repository).fallback(method_not_allowed))
        .fallback(not_found)
        // Last added runs first: tracing, JSON rewrite of layer errors, body
        // limit, timeout, extractor limit.
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes))
        .layer(middleware::from_fn(json_layer_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let router = build_router(state, &config.server);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
