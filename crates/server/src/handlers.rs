//! Storage API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};
use unitrack_storage::{StorageError, StorageFolder};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Folder the API reads and writes
    pub folder: StorageFolder,
}

/// Error returned by the storage API as `{success: false, error}`.
#[derive(Debug)]
pub enum ApiError {
    /// Rejected input
    BadRequest(String),
    /// Missing file
    NotFound(String),
    /// Anything else
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(name) => {
                ApiError::BadRequest(format!("Invalid file name: {}", name))
            }
            StorageError::NotFound(name) => ApiError::NotFound(format!("File not found: {}", name)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Storage request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Body of a save request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Target file name
    pub file_name: String,

    /// A string is written verbatim, any other value pretty-printed
    pub content: Value,
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/storage-files`
pub async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let files = state.folder.list().await?;
    Ok(Json(json!({ "files": files })))
}

/// `GET /api/load-progress/{filename}`
pub async fn load_progress(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let raw = state.folder.load(&filename).await?;
    let data: Value = serde_json::from_str(&raw).map_err(|e| {
        warn!(file = %filename, error = %e, "Stored file is not valid JSON");
        ApiError::Internal(format!("{} is not valid JSON: {}", filename, e))
    })?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// `POST /api/save-progress`
pub async fn save_progress(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<Value>, ApiError> {
    let content = match request.content {
        Value::String(text) => text,
        other => serde_json::to_string_pretty(&other)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    };

    state.folder.save(&request.file_name, &content).await?;
    Ok(Json(json!({ "success": true, "fileName": request.file_name })))
}

/// `DELETE /api/delete-progress/{filename}`
pub async fn delete_progress(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.folder.remove(&filename).await? {
        return Err(ApiError::NotFound(format!("File not found: {}", filename)));
    }
    Ok(Json(json!({ "success": true, "fileName": filename })))
}
