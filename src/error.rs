use thiserror::Error;

use crate::blazegraph::namespace::NamespaceParseError;

/// Failures talking to Blazegraph or the Turtle ingestion endpoint.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, timeout, DNS failure and friends
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Namespace listing was not well-formed XML
    #[error("failed to parse namespace listing: {0}")]
    Parse(#[from] NamespaceParseError),

    /// Namespace listing was served with an unexpected content type
    #[error("unexpected content type `{content_type}`")]
    UnexpectedFormat { content_type: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Read status and body off a failed upstream response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ClientError::Upstream { status, body }
    }
}
