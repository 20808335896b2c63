use async_trait::async_trait;

use crate::{
    domain::models::blob::{ObjectContent, StoredObject, UploadData},
    services::StorageError,
};

/// Primitives of a single blob container.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Base URI of the container, without a trailing slash.
    fn container_uri(&self) -> &str;

    /// Every object in the container, following pagination to the end.
    async fn list(&self) -> Result<Vec<StoredObject>, StorageError>;

    /// Writes a new object keyed by `data.filename`.
    ///
    /// Fails with [`StorageError::AlreadyExists`] instead of overwriting.
    async fn put(&self, data: UploadData<'_>) -> Result<StoredObject, StorageError>;

    async fn get(&self, key: &str) -> Result<ObjectContent, StorageError>;

    /// Fails with [`StorageError::NotFound`] when the key is absent.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
