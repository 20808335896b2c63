use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::{
    controllers::{blob_controller::BlobController, health_controller::HealthController},
    state::AppState,
};

pub fn configure_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(HealthController::health_check))
        .route("/api/files", get(BlobController::list_files))
        .route("/api/files/Upload", post(BlobController::upload_file))
}
