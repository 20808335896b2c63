use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::{
        dto::blob_dto::{blob_uri, BlobDto, BlobResponseDto},
        error::ApplicationError,
        services::BlobStore,
    },
    domain::models::blob::UploadData,
    services::StorageError,
};

/// Maps container operations onto the blob DTO contract.
///
/// Conflicts and missing keys on mutating operations come back as
/// `BlobResponseDto { error: true, .. }` rather than as errors.
pub struct BlobService {
    store: Arc<dyn BlobStore>,
    container: String,
}

impl BlobService {
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub async fn list(&self) -> Result<Vec<BlobDto>, ApplicationError> {
        let objects = self.store.list().await.map_err(|e| {
            error!("Failed to list container '{}': {}", self.container, e);
            ApplicationError::Unavailable(e.to_string())
        })?;

        let container_uri = self.store.container_uri();
        Ok(objects
            .into_iter()
            .map(|object| BlobDto::from_object(container_uri, object))
            .collect())
    }

    pub async fn upload(&self, file: UploadData<'_>) -> BlobResponseDto {
        let filename = file.filename.clone();

        match self.store.put(file).await {
            Ok(object) => {
                info!("Uploaded {} to container '{}'", object.key, self.container);
                BlobResponseDto::uploaded(
                    format!("File {} Uploaded Successfully", filename),
                    blob_uri(self.store.container_uri(), &object.key),
                    object.key,
                )
            }
            Err(StorageError::AlreadyExists(_)) => {
                error!(
                    "File with name {} already exists in container. Set another name to store the file in the container: '{}'.",
                    filename, self.container
                );
                BlobResponseDto::failure(format!(
                    "File with name {} already exists. Please use another name to store your file.",
                    filename
                ))
            }
            Err(e) => unexpected_failure("upload", &filename, e),
        }
    }

    /// `Ok(None)` when the key does not exist.
    pub async fn download(&self, name: &str) -> Result<Option<BlobDto>, ApplicationError> {
        match self.store.get(name).await {
            Ok(content) => Ok(Some(BlobDto {
                uri: blob_uri(self.store.container_uri(), name),
                name: name.to_string(),
                content_type: content.content_type,
                content: Some(content.body),
            })),
            Err(StorageError::NotFound(_)) => {
                error!("File {} was not found.", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, name: &str) -> BlobResponseDto {
        match self.store.delete(name).await {
            Ok(()) => {
                info!("Deleted {} from container '{}'", name, self.container);
                BlobResponseDto::success(format!("File: {} has been successfully deleted.", name))
            }
            Err(StorageError::NotFound(_)) => {
                error!("File {} was not found.", name);
                BlobResponseDto::failure(format!("File with name {} not found.", name))
            }
            Err(e) => unexpected_failure("delete", name, e),
        }
    }
}

/// Logs the fault under a fresh reference and returns only that reference to the caller.
fn unexpected_failure(operation: &str, name: &str, e: StorageError) -> BlobResponseDto {
    let reference = Uuid::new_v4();
    error!(%reference, "Unhandled storage error during {} of {}: {}", operation, name, e);
    BlobResponseDto::failure(format!(
        "Unexpected error: {}. Check log with reference ID.",
        reference
    ))
}
