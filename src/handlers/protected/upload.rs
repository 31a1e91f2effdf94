use std::path::Path;

use axum::extract::{multipart::MultipartError, Multipart, State};
use axum::http::StatusCode;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// POST /api/upload - store the `image` part and return its public URL
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Value> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let extension = stored_extension(field.file_name());
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(ApiError::field_error(IMAGE_FIELD, "File is empty"));
        }

        let file_name = format!("{}{}", Uuid::new_v4(), extension);
        let dir = Path::new(&state.config.api.upload_dir);
        tokio::fs::create_dir_all(dir).await.map_err(storage_error)?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(storage_error)?;

        info!(file = %file_name, size = bytes.len(), "stored upload");
        let url = format!("{}/api/uploads/{}", state.config.api.public_url, file_name);
        return Ok(ApiResponse::success(json!({ "url": url })));
    }

    Err(ApiError::field_error(IMAGE_FIELD, "File is required"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Upload exceeds the request size limit".to_string())
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn storage_error(err: std::io::Error) -> ApiError {
    tracing::error!("Failed to store upload: {}", err);
    ApiError::internal_server_error("Could not store file")
}

/// Extension to keep from the client's file name: short, lowercase, alphanumeric
fn stored_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
