use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{stream, StreamExt, TryStreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    application::services::BlobStore,
    domain::models::blob::{ObjectContent, StoredObject, UploadData},
    services::error::StorageError,
};

struct MemoryObject {
    content_type: String,
    data: Bytes,
}

/// Container kept in process memory, ordered by key.
pub struct MemoryBlobStore {
    container_uri: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
}

impl MemoryBlobStore {
    pub fn new(container_uri: impl Into<String>) -> Self {
        Self {
            container_uri: container_uri.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn container_uri(&self) -> &str {
        &self.container_uri
    }

    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .map(|(key, object)| StoredObject {
                key: key.clone(),
                content_type: Some(object.content_type.clone()),
            })
            .collect())
    }

    async fn put(&self, data: UploadData<'_>) -> Result<StoredObject, StorageError> {
        // Reject before reading the body
        if self.objects.read().await.contains_key(&data.filename) {
            return Err(StorageError::AlreadyExists(data.filename));
        }

        let buffer = data
            .body
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;

        // The body is fully read before the key becomes visible
        let mut objects = self.objects.write().await;
        if objects.contains_key(&data.filename) {
            return Err(StorageError::AlreadyExists(data.filename));
        }

        debug!("PUT {} ({} bytes, {})", data.filename, buffer.len(), data.content_type);
        objects.insert(
            data.filename.clone(),
            MemoryObject {
                content_type: data.content_type.clone(),
                data: buffer.freeze(),
            },
        );

        Ok(StoredObject {
            key: data.filename,
            content_type: Some(data.content_type),
        })
    }

    async fn get(&self, key: &str) -> Result<ObjectContent, StorageError> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectContent {
            content_type: Some(object.content_type.clone()),
            body: stream::once(futures::future::ready(Ok(object.data.clone()))).boxed(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
