//! API routes and handlers.

mod health;
mod predict;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Uploads beyond this are rejected before they reach the pipeline.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict::predict))
        .route("/health", get(health::health_check))
        .nest_service("/static/charts", ServeDir::new(&state.chart_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use greenlens_core::{AudioAnalyzer, AudioServiceConfig, ClassMap, EventClassifier};
    use ndarray::Array2;
    use std::io::Cursor;
    use tower::ServiceExt;

    /// Classifier whose output is fixed per test.
    struct FixedScores(Array2<f32>);

    impl EventClassifier for FixedScores {
        fn scores(&self, _waveform: &[f32]) -> greenlens_core::Result<Array2<f32>> {
            Ok(self.0.clone())
        }
    }

    fn test_app(scores: Array2<f32>, names: &[&str]) -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let config = AudioServiceConfig {
            upload_dir: tmp.path().join("uploads"),
            chart_dir: tmp.path().join("charts"),
            ..AudioServiceConfig::default()
        };
        greenlens_core::storage::ensure_dir(&config.upload_dir).unwrap();
        greenlens_core::storage::ensure_dir(&config.chart_dir).unwrap();

        let analyzer = AudioAnalyzer::new(
            Box::new(FixedScores(scores)),
            ClassMap::from_names(names.iter().map(|s| s.to_string()).collect()),
        );
        (create_router(AppState::new(analyzer, &config)), tmp)
    }

    fn wav_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    const BOUNDARY: &str = "test-boundary";

    fn multipart_request(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::HOST, "localhost:5000")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (app, _tmp) = test_app(Array2::zeros((1, 1)), &["Speech"]);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn missing_file_field_is_a_client_error() {
        let (app, _tmp) = test_app(Array2::zeros((1, 1)), &["Speech"]);
        let resp = app
            .oneshot(multipart_request("not_file", "clip.wav", b"xxxx"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "No file part");
    }

    #[tokio::test]
    async fn empty_filename_is_a_client_error() {
        let (app, _tmp) = test_app(Array2::zeros((1, 1)), &["Speech"]);
        let resp = app
            .oneshot(multipart_request("file", "", b"xxxx"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "No selected file");
    }

    #[tokio::test]
    async fn silent_clip_yields_empty_results_and_floor_decibel() {
        let (app, _tmp) = test_app(Array2::zeros((4, 2)), &["Speech", "Dog"]);
        let resp = app
            .oneshot(multipart_request("file", "silence.wav", &wav_bytes(&vec![0; 1600])))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 0);
        assert_eq!(body["decibel"].as_f64().unwrap(), -90.0);
        assert!(body["chart_url"].is_null());
        assert!(body["safety_tips"][0].as_str().unwrap().starts_with("SAFE"));
    }

    #[tokio::test]
    async fn ranked_results_come_back_as_label_percentage_pairs() {
        let scores = Array2::from_shape_vec((1, 3), vec![0.2, 0.6, 0.2]).unwrap();
        let (app, _tmp) = test_app(scores, &["Speech", "Dog", "Music"]);
        let resp = app
            .oneshot(multipart_request("file", "clip.wav", &wav_bytes(&vec![2000; 1600])))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results[0][0], "Dog");
        assert!((results[0][1].as_f64().unwrap() - 60.0).abs() < 1e-3);
        let chart_url = body["chart_url"].as_str().unwrap();
        assert!(chart_url.starts_with("http://localhost:5000/static/charts/"));
        assert!(chart_url.ends_with(".png"));
    }

    #[tokio::test]
    async fn corrupt_upload_is_a_server_error_not_a_crash() {
        let (app, _tmp) = test_app(Array2::zeros((1, 1)), &["Speech"]);
        let resp = app
            .oneshot(multipart_request("file", "broken.wav", b"definitely not a wav"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }
}
