use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use blob_files::{
    adapters::{routes::configure_routes, state::AppState},
    application::services::{BlobService, BlobStore},
    domain::config::storage::StorageConfig,
    services,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Must run before the S3 client performs any TLS handshake
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    tracing::info!("Blob files API booting up...");

    let storage_config = StorageConfig::from_env()
        .expect("ERROR: Invalid storage configuration. Check the STORAGE_* environment variables.");

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid u16");

    let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
        .ok()
        .map(|v| v.parse::<usize>().expect("MAX_UPLOAD_BYTES must be a number of bytes"))
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    let cors = if let Ok(allowed_origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
        let origins: Vec<_> = allowed_origins
            .split(',')
            .map(|s| s.trim().parse().expect("Invalid CORS origin"))
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow all origins if not specified (only for development)
        CorsLayer::permissive()
    };

    let store = services::create_blob_store(&storage_config)
        .expect("Failed to create blob store");

    tracing::info!(
        "Using {} storage, container '{}' at {}",
        storage_config.provider,
        storage_config.container,
        store.container_uri()
    );

    let app_state = AppState {
        provider: storage_config.provider,
        blob_service: Arc::new(BlobService::new(store, storage_config.container.clone())),
    };

    let router: Router = configure_routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    tracing::info!("Blob files API shutting down...");
}
