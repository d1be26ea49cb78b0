use axum::extract::multipart::MultipartRejection;
use axum::body::Bytes;
use axum::extract::Request;
use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;

use super::dto::{
    required, ActiveDatabaseResponse, ActiveRepositoryResponse, ConnectRequest, ConnectResponse,
    CreateDatabaseForm, CreateNamespaceRequest, ErrorDetailsResponse, ErrorResponse,
    MessageResponse, PortValue,
};
use super::error::{mirrored_status, ApiError};
use super::AppState;
use crate::blazegraph::properties::property_value_text;
use crate::blazegraph::{ConnectionTarget, ProbeOutcome};
use crate::error::ClientError;
use crate::uploads::{FileListResponse, FileSummary};

/// Name recorded for a `file` part sent without a file name.
const DEFAULT_UPLOAD_NAME: &str = "upload.ttl";

fn json<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

fn error_json(status: StatusCode, error: impl Into<String>) -> Response {
    json(status, ErrorResponse::new(error))
}

pub async fn homepage() -> &'static str {
    "Welcome to the homepage!"
}

pub async fn method_not_allowed() -> Response {
    error_json(StatusCode::METHOD_NOT_ALLOWED, "Invalid request method.")
}

pub async fn not_found() -> Response {
    error_json(StatusCode::NOT_FOUND, "Not found.")
}

/// Rewrite the bodiless or plain-text 408/413 produced by the timeout and
/// body-limit layers as `{error}` JSON. Handler responses pass untouched.
pub async fn json_layer_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }
    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            error_json(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
        }
        StatusCode::REQUEST_TIMEOUT => error_json(StatusCode::REQUEST_TIMEOUT, "Request timed out."),
        _ => response,
    }
}

/// `GET /files`
pub async fn list_files(State(state): State<AppState>) -> Response {
    match state.files.list_all() {
        Ok(records) => {
            let files = records.into_iter().map(FileSummary::from).collect();
            json(StatusCode::OK, FileListResponse { files })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list uploaded files");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, format!("An error occurred: {e}"))
        }
    }
}

/// `POST /database`, form field `namespace`.
pub async fn create_database(
    State(state): State<AppState>,
    form: Result<Form<CreateDatabaseForm>, FormRejection>,
) -> Response {
    let result = async move {
        let Form(form) = form.map_err(|e| ApiError::Validation(e.body_text()))?;
        let namespace = required(&form.namespace)
            .ok_or_else(|| ApiError::Validation("Namespace is required.".into()))?;
        state.blazegraph.create_database_namespace(namespace).await?;
        Ok::<_, ApiError>(())
    }
    .await;

    match result {
        Ok(()) => json(
            StatusCode::OK,
            MessageResponse::new("Database created successfully"),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Database creation failed");
            let (error, details) = match &e {
                ApiError::Validation(msg) => (msg.clone(), String::new()),
                ApiError::Client(ClientError::Upstream { body, .. }) => {
                    ("Failed to create database".to_string(), body.clone())
                }
                other => ("Failed to create database".to_string(), other.to_string()),
            };
            json(e.status(), ErrorDetailsResponse { error, details })
        }
    }
}

/// `POST /namespace`, JSON `{namespace, properties?}`. The body is read as
/// JSON whatever its `Content-Type`.
pub async fn create_namespace(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async move {
        let req: CreateNamespaceRequest = serde_json::from_slice(&body)
            .map_err(|_| ApiError::Validation("Invalid JSON payload.".into()))?;
        let namespace = required(&req.namespace)
            .ok_or_else(|| ApiError::Validation("Namespace is required.".into()))?
            .to_string();

        let mut properties = Vec::new();
        for (key, value) in req.properties.unwrap_or_default() {
            let text = property_value_text(&value).ok_or_else(|| {
                ApiError::Validation(format!(
                    "Property '{key}' must be a string, number or boolean."
                ))
            })?;
            properties.push((key, text));
        }

        state
            .blazegraph
            .create_namespace(&namespace, &properties)
            .await?;
        Ok::<_, ApiError>(namespace)
    }
    .await;

    match result {
        Ok(namespace) => json(
            StatusCode::OK,
            MessageResponse::new(format!("Namespace '{namespace}' created successfully.")),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Namespace creation failed");
            let message = match &e {
                ApiError::Validation(msg) => msg.clone(),
                ApiError::Client(ClientError::Upstream { status, body }) => format!(
                    "Failed to create namespace. Status code: {status}, Response: {body}"
                ),
                other => format!("An error occurred: {other}"),
            };
            error_json(e.status(), message)
        }
    }
}

/// `POST /upload`, multipart parts `file` and `graph_id`.
///
/// The metadata record is written before the file is forwarded and is kept
/// even when forwarding fails.
pub async fn upload_turtle_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            return error_json(
                StatusCode::BAD_REQUEST,
                format!("Invalid multipart payload: {}", e.body_text()),
            )
        }
    };

    let mut file = None;
    let mut graph_id = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_json(e.status(), format!("Invalid multipart payload: {}", e.body_text()))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let read = match name.as_str() {
            "file" => field.bytes().await.map(|data| {
                file = Some((file_name.unwrap_or_else(|| DEFAULT_UPLOAD_NAME.into()), data));
            }),
            "graph_id" => field.text().await.map(|text| graph_id = Some(text)),
            _ => Ok(()),
        };
        if let Err(e) = read {
            return error_json(e.status(), format!("Invalid multipart payload: {}", e.body_text()));
        }
    }

    let Some((file_name, data)) = file else {
        return error_json(StatusCode::BAD_REQUEST, "No file provided.");
    };
    let Some(graph_id) = required(&graph_id).map(str::to_string) else {
        return error_json(StatusCode::BAD_REQUEST, "graph_id is required.");
    };

    let size = data.len() as u64;
    let record = match state.files.create(&file_name, &graph_id, size) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(file = %file_name, error = %e, "Failed to record upload");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, format!("An error occurred: {e}"));
        }
    };
    tracing::info!(id = %record.id, file = %file_name, graph_id = %graph_id, size, "Recorded upload");

    match state.ingestor.forward(&file_name, data).await {
        Ok(()) => json(
            StatusCode::OK,
            MessageResponse::new(format!("File '{file_name}' uploaded successfully.")),
        ),
        Err(e) => {
            tracing::warn!(id = %record.id, file = %file_name, error = %e, "Ingestion failed, upload record kept");
            let message = match &e {
                ClientError::Upstream { status, body } => format!(
                    "Failed to upload file to the server. Status code: {status}, Response: {body}"
                ),
                other => format!("An error occurred: {other}"),
            };
            error_json(ApiError::from(e).status(), message)
        }
    }
}

/// `POST /connect`, JSON `{ipAddress, port, databaseType}` in any content type.
pub async fn connect_database(State(state): State<AppState>, body: Bytes) -> Response {
    let failure = |status: StatusCode, message: String| {
        json(
            status,
            ConnectResponse {
                success: false,
                message,
            },
        )
    };

    let Ok(req) = serde_json::from_slice::<ConnectRequest>(&body) else {
        return failure(StatusCode::BAD_REQUEST, "Invalid JSON payload.".into());
    };
    let port = req.port.as_ref().and_then(PortValue::given);
    let (Some(ip_address), Some(port), Some(database_type)) =
        (required(&req.ip_address), port, required(&req.database_type))
    else {
        return failure(StatusCode::BAD_REQUEST, "Missing required fields".into());
    };

    let target = ConnectionTarget {
        ip_address: ip_address.to_string(),
        port,
        database_type: database_type.to_string(),
    };

    match state.blazegraph.probe_connectivity(&target).await {
        ProbeOutcome::Connected => json(
            StatusCode::OK,
            ConnectResponse {
                success: true,
                message: "Connected successfully".into(),
            },
        ),
        ProbeOutcome::Rejected { status } => {
            tracing::info!(url = %target.sparql_url(), status, "SPARQL endpoint refused probe");
            failure(mirrored_status(status), "Failed to connect".into())
        }
        ProbeOutcome::Unreachable { reason } => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, reason)
        }
    }
}

/// `GET /active-database`: the first namespace Blazegraph lists.
pub async fn active_database(State(state): State<AppState>) -> Response {
    let timeout = state.blazegraph.list_timeout();
    match state.blazegraph.list_namespaces(Some(timeout)).await {
        Ok(namespaces) => match namespaces.into_iter().next() {
            Some(active_database) => {
                tracing::info!(namespace = %active_database, "Found active database");
                json(StatusCode::OK, ActiveDatabaseResponse { active_database })
            }
            None => {
                tracing::warn!("No namespaces found");
                json(StatusCode::NOT_FOUND, MessageResponse::new("No namespaces found"))
            }
        },
        Err(e) => {
            let message = match &e {
                ClientError::Transport(_) | ClientError::Upstream { .. } => {
                    format!("Failed to connect to Blazegraph: {e}")
                }
                ClientError::UnexpectedFormat { .. } => {
                    "Blazegraph returned an unexpected response format".to_string()
                }
                ClientError::Parse(_) => "Failed to parse Blazegraph response".to_string(),
            };
            tracing::error!(error = %e, "Failed to fetch active database");
            json(StatusCode::INTERNAL_SERVER_ERROR, MessageResponse::new(message))
        }
    }
}

/// `GET /active-repository`: every namespace Blazegraph lists.
pub async fn active_repository(State(state): State<AppState>) -> Response {
    match state.blazegraph.list_namespaces(None).await {
        Ok(namespaces) if namespaces.is_empty() => json(
            StatusCode::NOT_FOUND,
            MessageResponse::new("No active repositories found"),
        ),
        Ok(active_repositories) => json(
            StatusCode::OK,
            ActiveRepositoryResponse {
                active_repositories,
            },
        ),
        Err(e) => {
            let message = match &e {
                ClientError::UnexpectedFormat { .. } => {
                    "Blazegraph returned an unexpected response format".to_string()
                }
                ClientError::Parse(_) => "Failed to parse Blazegraph response".to_string(),
                ClientError::Transport(_) | ClientError::Upstream { .. } => {
                    format!("Failed to fetch active repositories: {e}")
                }
            };
            tracing::error!(error = %e, "Failed to fetch active repositories");
            json(StatusCode::INTERNAL_SERVER_ERROR, MessageResponse::new(message))
        }
    }
}
