use async_trait::async_trait;
use aws_sdk_s3::{
    config::{
        retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Credentials, Region,
    },
    primitives::ByteStream,
    Client,
};
use futures::{stream, StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::{
    application::services::BlobStore,
    domain::{
        config::storage::{S3Settings, StorageConfig},
        models::blob::{ObjectContent, StoredObject, UploadData},
    },
    services::error::StorageError,
};

/// Concurrent HEAD requests issued while resolving content types for a listing.
const LIST_HEAD_CONCURRENCY: usize = 8;

pub struct S3BlobStore {
    client: Client,
    bucket: String,
    container_uri: String,
}

impl S3BlobStore {
    pub fn new(config: &StorageConfig, settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "blob-files",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.container.clone(),
            container_uri: container_uri(config, settings),
        }
    }

    async fn content_type(&self, key: &str) -> Result<Option<String>, StorageError> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::from_s3(key, e))?;

        Ok(response.content_type().map(str::to_string))
    }
}

/// Public base URI of the bucket: explicit override, custom endpoint (path-style) or AWS virtual host.
fn container_uri(config: &StorageConfig, settings: &S3Settings) -> String {
    if let Some(url) = &config.public_url {
        return url.clone();
    }

    match &settings.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint, config.container),
        None => format!(
            "https://{}.s3.{}.amazonaws.com",
            config.container, settings.region
        ),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn container_uri(&self) -> &str {
        &self.container_uri
    }

    async fn list(&self) -> Result<Vec<StoredObject>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::from_s3(&self.bucket, e))?;
            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));
        }

        debug!("LIST {} ({} objects)", self.bucket, keys.len());

        // ListObjectsV2 carries no content type, so each object is HEADed
        let objects: Vec<Option<StoredObject>> = stream::iter(keys)
            .map(|key| async move {
                match self.content_type(&key).await {
                    Ok(content_type) => Ok(Some(StoredObject { key, content_type })),
                    // Deleted between the listing and the HEAD request
                    Err(StorageError::NotFound(_)) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .buffered(LIST_HEAD_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(objects.into_iter().flatten().collect())
    }

    async fn put(&self, data: UploadData<'_>) -> Result<StoredObject, StorageError> {
        let UploadData {
            filename,
            content_type,
            mut body,
        } = data;

        // Spool to disk so PutObject gets a known length without holding the file in memory
        let spool = tempfile::NamedTempFile::new()?;
        let mut file = tokio::fs::File::from_std(spool.reopen()?);
        let mut size: u64 = 0;
        while let Some(chunk) = body.try_next().await? {
            size += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        debug!("PUT {} ({} bytes, {})", filename, size, content_type);

        let payload = ByteStream::from_path(spool.path())
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&filename)
            .content_type(&content_type)
            .if_none_match("*")
            .body(payload)
            .send()
            .await
            .map_err(|e| StorageError::from_s3(&filename, e))?;

        Ok(StoredObject {
            key: filename,
            content_type: Some(content_type),
        })
    }

    async fn get(&self, key: &str) -> Result<ObjectContent, StorageError> {
        debug!("GET {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::from_s3(key, e))?;

        let content_type = response.content_type().map(str::to_string);
        let reader = response.body.into_async_read();

        Ok(ObjectContent {
            content_type,
            body: ReaderStream::new(reader).boxed(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // DeleteObject succeeds for missing keys, so existence is checked first
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::from_s3(key, e))?;

        debug!("DELETE {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to delete {}: {}", key, e);
                StorageError::from_s3(key, e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::config::storage::Provider;

    fn config(endpoint: Option<&str>, public_url: Option<&str>) -> (StorageConfig, S3Settings) {
        let settings = S3Settings {
            endpoint: endpoint.map(str::to_string),
            region: "eu-west-1".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
        };
        let config = StorageConfig {
            provider: Provider::S3,
            container: "uploads".to_string(),
            public_url: public_url.map(str::to_string),
            timeout: Duration::from_secs(10),
            s3: Some(settings.clone()),
        };
        (config, settings)
    }

    #[test]
    fn aws_buckets_use_virtual_host_uris() {
        let (config, settings) = config(None, None);
        assert_eq!(
            container_uri(&config, &settings),
            "https://uploads.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn custom_endpoints_use_path_style_uris() {
        let (config, settings) = config(Some("http://localhost:9000"), None);
        assert_eq!(
            container_uri(&config, &settings),
            "http://localhost:9000/uploads"
        );
    }

    #[test]
    fn public_url_overrides_the_endpoint() {
        let (config, settings) =
            config(Some("http://minio:9000"), Some("https://cdn.example.com/files"));
        assert_eq!(
            container_uri(&config, &settings),
            "https://cdn.example.com/files"
        );
    }

    #[tokio::test]
    async fn store_reports_its_container_uri() {
        let (config, settings) = config(Some("http://localhost:9000"), None);
        let store = S3BlobStore::new(&config, &settings);
        assert_eq!(store.container_uri(), "http://localhost:9000/uploads");
    }
}
