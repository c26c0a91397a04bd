//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use greenlens_core::{ObjectDetector, VisionServiceConfig};
use tokio::sync::Semaphore;

/// Shared state: the injected detector plus a request semaphore.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub request_semaphore: Arc<Semaphore>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(detector: Box<dyn ObjectDetector>, config: &VisionServiceConfig) -> Self {
        let max_concurrent = std::env::var("MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Self {
            detector: Arc::from(detector),
            request_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            upload_dir: config.upload_dir.clone(),
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
