//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use greenlens_core::{AudioAnalyzer, AudioServiceConfig};
use tokio::sync::Semaphore;

/// Shared state: the injected analyzer plus a request semaphore.
///
/// The ONNX session serializes inference anyway; the semaphore keeps
/// queued uploads from piling up on blocking threads.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<AudioAnalyzer>,
    pub request_semaphore: Arc<Semaphore>,
    pub upload_dir: PathBuf,
    pub chart_dir: PathBuf,
}

impl AppState {
    pub fn new(analyzer: AudioAnalyzer, config: &AudioServiceConfig) -> Self {
        let max_concurrent = std::env::var("MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Self {
            analyzer: Arc::new(analyzer),
            request_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            upload_dir: config.upload_dir.clone(),
            chart_dir: config.chart_dir.clone(),
        }
    }

    /// Acquire a permit for inference.
    pub async fn acquire_permit(&self) -> tokio::sync::SemaphorePermit<'_> {
        self.request_semaphore
            .acquire()
            .await
            .expect("semaphore is never closed")
    }
}
