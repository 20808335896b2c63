mod error;
mod memory_blob_store;
mod s3_blob_store;

pub use error::StorageError;
pub use memory_blob_store::MemoryBlobStore;
pub use s3_blob_store::S3BlobStore;

use std::sync::Arc;

use crate::{
    application::services::BlobStore,
    domain::config::storage::{Provider, StorageConfig},
};

pub fn create_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.provider {
        Provider::S3 => {
            let settings = config.s3.as_ref().ok_or_else(|| {
                StorageError::InvalidConfig("S3 settings not found".to_string())
            })?;

            Ok(Arc::new(S3BlobStore::new(config, settings)))
        }
        Provider::Memory => {
            let uri = config
                .public_url
                .clone()
                .unwrap_or_else(|| format!("memory://{}", config.container));

            Ok(Arc::new(MemoryBlobStore::new(uri)))
        }
    }
}
