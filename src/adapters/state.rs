use std::sync::Arc;

use axum::extract::FromRef;

use crate::{application::services::BlobService, domain::config::storage::Provider};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub provider: Provider,
    pub blob_service: Arc<BlobService>,
}
