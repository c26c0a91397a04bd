//! The `/predict` endpoint: upload a WAV clip, get the ranked event
//! breakdown, a loudness estimate and safety advice back.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use greenlens_core::{chart, storage, SafetyTier};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Ranked (label, percentage) pairs, serialized as `[label, pct]`.
    pub results: Vec<(String, f32)>,
    pub decibel: f32,
    pub chart_url: Option<String>,
    pub safety_tips: Vec<String>,
}

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let (filename, bytes) = read_file_field(multipart).await?;
    info!("audio predict: {} ({} bytes)", filename, bytes.len());

    // Keep the upload around, as the original service does. Failure to
    // archive is not failure to classify.
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

    let analyzer = Arc::clone(&state.analyzer);
    let analysis = tokio::task::spawn_blocking(move || analyzer.analyze(&bytes))
        .await
        .map_err(|e| ApiError::internal(format!("analysis task: {e}")))??;

    let chart_url = if analysis.results.is_empty() {
        None
    } else {
        let chart_name = format!("{}.png", Uuid::new_v4().simple());
        let chart_path = state.chart_dir.join(&chart_name);
        let results = analysis.results.clone();
        let rendered =
            tokio::task::spawn_blocking(move || chart::render_pie_chart(&results, &chart_path))
                .await
                .map_err(|e| ApiError::internal(format!("chart task: {e}")))?;

        match rendered {
            // The chart is decoration over the JSON payload; losing it
            // does not invalidate the classification.
            Err(e) => {
                warn!("chart rendering failed: {e}");
                None
            }
            Ok(()) => request_host(&headers)
                .map(|host| format!("http://{host}/static/charts/{chart_name}")),
        }
    };

    let decibel = analysis.decibel;
    let safety_tips = SafetyTier::for_decibel(decibel).safety_tips(decibel);

    Ok(Json(PredictResponse {
        results: analysis.results,
        decibel,
        chart_url,
        safety_tips,
    }))
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
            return Err(ApiError::bad_request("No selected file"));
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

    Err(ApiError::bad_request("No file part"))
}

/// Base host for building the chart URL, from the request Host header.
fn request_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
