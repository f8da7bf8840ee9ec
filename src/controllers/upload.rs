use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::StorageKeyPolicy;
use crate::AppState;

pub fn routes(max_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload/", post(upload_file))
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(max_bytes))
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("missing required 'file' field")]
    MissingFile,
    #[error("'file' field has no filename")]
    MissingFilename,
    #[error("malformed multipart body: {0}")]
    Multipart(MultipartError),
    #[error("failed to read upload: {0}")]
    Read(MultipartError),
    #[error("invalid filename {0:?}")]
    InvalidFilename(String),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFile | UploadError::MissingFilename => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            UploadError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            UploadError::Multipart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::Read(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            UploadError::Read(_) | UploadError::InvalidFilename(_) | UploadError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("upload failed: {}", self);
        } else {
            warn!("upload rejected: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// prompt/params можно передать и в query string; поля формы имеют приоритет
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub prompt: Option<String>,
    pub params: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub filename: String,
    pub prompt: Option<String>,
    pub params: Option<String>,
}

/// Name of the file inside the upload directory. Only the final path
/// component of the client filename is used.
pub fn storage_key(filename: &str, policy: StorageKeyPolicy) -> Result<String, UploadError> {
    let base = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| UploadError::InvalidFilename(filename.to_string()))?;

    Ok(match policy {
        StorageKeyPolicy::Original => base.to_string(),
        StorageKeyPolicy::Unique => format!("{}_{}", Uuid::new_v4().simple(), base),
    })
}

// POST /upload/
#[instrument(skip(state, query, multipart))]
async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let mut file: Option<(Option<String>, axum::body::Bytes)> = None;
    let mut prompt = query.prompt;
    let mut params = query.params;

    while let Some(field) = multipart.next_field().await.map_err(UploadError::Multipart)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let content = field.bytes().await.map_err(UploadError::Read)?;
                file = Some((filename, content));
            }
            Some("prompt") => prompt = Some(field.text().await.map_err(UploadError::Read)?),
            Some("params") => params = Some(field.text().await.map_err(UploadError::Read)?),
            _ => {} // неизвестные поля игнорируем
        }
    }

    let (filename, content) = file.ok_or(UploadError::MissingFile)?;
    let filename = filename.ok_or(UploadError::MissingFilename)?;

    let key = storage_key(&filename, state.upload.key_policy)?;
    let destination = state.upload.dir.join(&key);
    tokio::fs::write(&destination, &content).await?;

    info!(
        filename = %filename,
        stored_as = %destination.display(),
        bytes = content.len(),
        "upload stored"
    );

    Ok((StatusCode::OK, Json(UploadResponse { filename, prompt, params })))
}
