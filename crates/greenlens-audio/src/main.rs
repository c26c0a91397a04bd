//! GreenLens audio service - event classification and loudness over HTTP.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;

use greenlens_core::{storage, AudioAnalyzer, AudioServiceConfig, ClassMap, OnnxEventClassifier};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "greenlens_audio=debug,greenlens_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GreenLens audio service");

    let config = AudioServiceConfig::default();
    storage::ensure_dir(&config.upload_dir)?;
    storage::ensure_dir(&config.chart_dir)?;

    // Model loading is CPU-heavy; keep it off the runtime threads.
    let model_path = config.model_path.clone();
    let class_map_path = config.class_map_path.clone();
    let analyzer = tokio::task::spawn_blocking(move || {
        let classifier = OnnxEventClassifier::load(&model_path)?;
        let class_map = ClassMap::from_csv_file(&class_map_path)?;
        Ok::<_, greenlens_core::Error>(AudioAnalyzer::new(Box::new(classifier), class_map))
    })
    .await??;

    info!("audio-event model and class map loaded");

    let state = AppState::new(analyzer, &config);
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("audio service listening on http://{}", addr);

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
