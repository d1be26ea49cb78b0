use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::namespace::parse_namespace_list;
use super::properties::{database_properties_json, to_property_text};
use crate::config::BlazegraphConfig;
use crate::error::{ClientError, Result};

/// Media type Blazegraph uses for the namespace listing.
const RDF_XML: &str = "application/rdf+xml";

/// Build the HTTP client shared by the Blazegraph and ingestion calls.
pub fn http_client(config: &BlazegraphConfig) -> reqwest::Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(config.connect_timeout())
        // Default request timeout (overridden per-request)
        .timeout(config.request_timeout())
        .build()
}

/// Host, port and namespace to probe from `POST /connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub ip_address: String,
    pub port: String,
    pub database_type: String,
}

impl ConnectionTarget {
    /// SPARQL endpoint of the target namespace.
    pub fn sparql_url(&self) -> String {
        let host = if self.ip_address.contains(':') && !self.ip_address.starts_with('[') {
            format!("[{}]", self.ip_address)
        } else {
            self.ip_address.clone()
        };
        format!(
            "http://{}:{}/blazegraph/namespace/{}/sparql",
            host,
            self.port,
            urlencoding::encode(&self.database_type)
        )
    }
}

/// Result of a connectivity probe. Never an error: unreachable targets are
/// an expected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected,
    /// The endpoint answered with a non-success status
    Rejected { status: u16 },
    /// The endpoint could not be reached at all
    Unreachable { reason: String },
}

/// Client for Blazegraph's namespace management API.
#[derive(Debug, Clone)]
pub struct BlazegraphClient {
    http: Client,
    base_url: String,
    list_timeout: Duration,
}

impl BlazegraphClient {
    pub fn new(http: Client, config: &BlazegraphConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            list_timeout: config.list_timeout(),
        }
    }

    /// Timeout applied to the active-database lookup.
    pub fn list_timeout(&self) -> Duration {
        self.list_timeout
    }

    /// `{base}/blazegraph/namespace`
    pub fn namespace_endpoint(&self) -> String {
        format!("{}/blazegraph/namespace", self.base_url)
    }

    fn namespace_url(&self, namespace: &str) -> String {
        format!(
            "{}/{}",
            self.namespace_endpoint(),
            urlencoding::encode(namespace)
        )
    }

    /// Create `namespace` with the fixed database property set.
    pub async fn create_database_namespace(&self, namespace: &str) -> Result<()> {
        let url = self.namespace_url(namespace);
        tracing::info!(namespace = %namespace, url = %url, "Creating Blazegraph database");

        let response = self
            .http
            .post(&url)
            .json(&database_properties_json())
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!(namespace = %namespace, "Created Blazegraph database");
            Ok(())
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    /// Create `namespace` from client-supplied properties, sent in
    /// Blazegraph's `key=value` text format.
    pub async fn create_namespace(
        &self,
        namespace: &str,
        properties: &[(String, String)],
    ) -> Result<()> {
        let url = self.namespace_endpoint();
        let body = to_property_text(
            properties.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            namespace,
        );
        tracing::debug!(namespace = %namespace, url = %url, payload = %body, "Creating Blazegraph namespace");

        // Blazegraph expects properties as text/plain body
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(namespace = %namespace, status = status.as_u16(), "Created Blazegraph namespace");
            Ok(())
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    /// Names of all namespaces, in the order Blazegraph lists them.
    ///
    /// `timeout` overrides the client's default request timeout.
    pub async fn list_namespaces(&self, timeout: Option<Duration>) -> Result<Vec<String>> {
        let url = self.namespace_endpoint();
        tracing::debug!(url = %url, "Listing Blazegraph namespaces");

        let mut request = self.http.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains(RDF_XML) {
            return Err(ClientError::UnexpectedFormat { content_type });
        }

        let body = response.bytes().await?;
        let namespaces = parse_namespace_list(&body)?;
        tracing::debug!(count = namespaces.len(), "Parsed namespace listing");
        Ok(namespaces)
    }

    /// Check that the target's SPARQL endpoint answers with a success status.
    pub async fn probe_connectivity(&self, target: &ConnectionTarget) -> ProbeOutcome {
        let url = target.sparql_url();
        tracing::debug!(url = %url, "Probing SPARQL endpoint");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Connected,
            Ok(response) => ProbeOutcome::Rejected {
                status: response.status().as_u16(),
            },
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "SPARQL endpoint unreachable");
                ProbeOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
