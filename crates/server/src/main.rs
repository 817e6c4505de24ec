//! Foodgram server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{ServiceExt, extract::DefaultBodyLimit, extract::Request};
use foodgram_api::{AppState, app};
use foodgram_common::{AppError, Config, LocalStorage};
use tokio::signal;
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    normalize_path::NormalizePathLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Recipe writes carry the image inline as base64.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// URL path the media directory is mounted at.
fn media_mount(url: &str) -> Result<String, AppError> {
    let path = url.trim_end_matches('/');
    if !path.starts_with('/') || path.len() < 2 {
        return Err(AppError::Config(format!(
            "media.url must be an absolute path such as /media, got {url:?}"
        )));
    }
    Ok(path.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting foodgram server...");

    let config = Config::load()?;

    let db = foodgram_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    foodgram_db::migrate(&db).await?;
    info!("Migrations completed");

    tokio::fs::create_dir_all(&config.media.root).await?;
    let media_path = media_mount(&config.media.url)?;
    let storage = Arc::new(LocalStorage::new(
        config.media.root.clone(),
        media_path.clone(),
    ));

    let state = AppState::new(Arc::new(db), &config, storage);

    let router = app(state)
        .nest_service(&media_path, ServeDir::new(&config.media.root))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // `/api/recipes/` and `/api/recipes` route the same
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server.host: {e}")))?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
