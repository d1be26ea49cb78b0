use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::IngestConfig;
use crate::error::{ClientError, Result};

/// Forwards uploaded Turtle files to the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct TurtleIngestor {
    http: Client,
    url: String,
}

impl TurtleIngestor {
    pub fn new(http: Client, config: &IngestConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
        }
    }

    /// POST the raw file bytes as `text/turtle`.
    pub async fn forward(&self, file_name: &str, data: impl Into<reqwest::Body>) -> Result<()> {
        tracing::debug!(file = %file_name, url = %self.url, "Forwarding Turtle file");

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/turtle")
            .body(data)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!(file = %file_name, "Turtle file ingested");
            Ok(())
        } else {
            Err(ClientError::from_response(response).await)
        }
    }
}
