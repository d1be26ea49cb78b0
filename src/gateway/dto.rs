//! Request and response bodies of the REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatabaseForm {
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNamespaceRequest {
    pub namespace: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// `port` arrives as a number from some clients and as a string from others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl PortValue {
    pub fn as_text(&self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Port as text; numeric `0` and blank text count as missing.
    pub fn given(&self) -> Option<String> {
        match self {
            PortValue::Number(0) => None,
            other => Some(other.as_text()).filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub ip_address: Option<String>,
    pub port: Option<PortValue>,
    pub database_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetailsResponse {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveDatabaseResponse {
    pub active_database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRepositoryResponse {
    pub active_repositories: Vec<String>,
}

/// Trimmed, non-empty value of an optional text field.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
