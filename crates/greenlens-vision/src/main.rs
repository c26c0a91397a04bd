//! GreenLens vision service - waste object detection over HTTP.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;

use greenlens_core::{storage, OnnxObjectDetector, VisionServiceConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "greenlens_vision=debug,greenlens_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GreenLens vision service");

    let config = VisionServiceConfig::default();
    storage::ensure_dir(&config.upload_dir)?;

    let detector = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            let labels = match &config.labels_path {
                Some(path) => OnnxObjectDetector::load_labels(path)?,
                None => Vec::new(),
            };
            OnnxObjectDetector::load(
                &config.model_path,
                config.input_size,
                config.confidence_threshold,
                labels,
            )
        })
        .await??
    };

    info!("detection model loaded");

    let state = AppState::new(Box::new(detector), &config);
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("vision service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
