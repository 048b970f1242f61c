// src/main.rs

use std::sync::Arc;

use studyhub::config::Config;
use studyhub::routes;
use studyhub::services::backend::HttpBackend;
use studyhub::session::Session;
use studyhub::state::AppState;
use studyhub::store::FileStore;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "studyhub.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let kv = Arc::new(FileStore::open(&config.data_dir)?);
    tracing::info!("Local state in {}", kv.root().display());

    let backend = Arc::new(HttpBackend::new(config.api_base_url.clone())?);
    tracing::info!("Backend at {}", config.api_base_url);

    let session = Arc::new(Session::new(kv, backend, config.poll_interval));

    // Resume the last login, which also resumes polling its pending jobs
    match session.restore().await {
        Some(user) => tracing::info!("Restored session for {}", user.username),
        None => tracing::info!("No persisted session, starting anonymous"),
    }

    // Front ends refetch on these; here they are only logged
    let mut invalidations = session.subscribe_invalidations();
    tokio::spawn(async move {
        loop {
            match invalidations.recv().await {
                Ok(scope) => tracing::info!("Cache invalidated: {:?}", scope),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Cache invalidation listener lagged by {}", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let state = AppState { session };

    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
