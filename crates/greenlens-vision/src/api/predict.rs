//! The `/predict` endpoint: upload an image, get it back with the
//! model's detections drawn in.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, Response},
};
use tracing::{info, warn};

use greenlens_core::{annotate, encode_jpeg, storage, Error};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<Body>, ApiError> {
    let (filename, bytes) = read_file_field(multipart).await?;
    info!("vision predict: {} ({} bytes)", filename, bytes.len());

    let upload_dir = state.upload_dir.clone();
    let upload_name = filename.clone();
    let upload_bytes = bytes.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || {
        storage::save_upload(&upload_dir, &upload_name, &upload_bytes)
    })
    .await
    .map_err(|e| ApiError::internal(format!("storage task: {e}")))?
    {
        warn!("failed to save upload {filename}: {e}");
    }

    let _permit = state.acquire_permit().await;

    let detector = Arc::clone(&state.detector);
    let jpeg = tokio::task::spawn_blocking(move || -> greenlens_core::Result<Vec<u8>> {
        let image = image::load_from_memory(&bytes)
            .map_err(|e| Error::ImageDecode(format!("failed to decode upload: {e}")))?;
        let detections = detector.detect(&image)?;
        info!("{} detections drawn", detections.len());
        encode_jpeg(&annotate(&image, &detections))
    })
    .await
    .map_err(|e| ApiError::internal(format!("detection task: {e}")))??;

    Response::builder()
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(
            header::CONTENT_DISPOSITION,
            "inline; filename=\"result.jpg\"",
        )
        .body(Body::from(jpeg))
        .map_err(|e| ApiError::internal(format!("build response: {e}")))
}

/// Pull the uploaded `file` field out of the multipart form.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::bad_request("Empty filename"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed reading 'file' field: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        return Ok((filename, bytes.to_vec()));
    }

    Err(ApiError::bad_request("No file uploaded"))
}
