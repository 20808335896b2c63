use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::services::StorageError;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum Provider {
    #[serde(rename = "s3")]
    S3,
    #[serde(rename = "memory")]
    Memory,
}

impl FromStr for Provider {
    type Err = StorageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Provider::S3),
            "memory" => Ok(Provider::Memory),
            other => Err(StorageError::InvalidConfig(format!(
                "Unknown storage provider '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::S3 => write!(f, "s3"),
            Provider::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: Provider,
    pub container: String,
    /// Base URI the object keys are appended to when building blob URIs.
    pub public_url: Option<String>,
    pub timeout: Duration,
    pub s3: Option<S3Settings>,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                StorageError::InvalidConfig(format!("{} environment variable must be set", name))
            })
        };

        let provider = match var("STORAGE_PROVIDER") {
            Some(value) => value.parse()?,
            None => Provider::S3,
        };

        let timeout = match var("STORAGE_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                StorageError::InvalidConfig(format!(
                    "STORAGE_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    value
                ))
            })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let public_url = var("STORAGE_PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string());

        match provider {
            Provider::S3 => Ok(Self {
                provider,
                container: required("STORAGE_CONTAINER")?,
                public_url,
                timeout,
                s3: Some(S3Settings {
                    endpoint: var("STORAGE_ENDPOINT")
                        .map(|url| url.trim_end_matches('/').to_string()),
                    region: var("STORAGE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                    access_key_id: required("STORAGE_ACCESS_KEY_ID")?,
                    secret_access_key: required("STORAGE_SECRET_ACCESS_KEY")?,
                }),
            }),
            Provider::Memory => Ok(Self {
                provider,
                container: var("STORAGE_CONTAINER").unwrap_or_else(|| "files".to_string()),
                public_url,
                timeout,
                s3: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn s3_is_the_default_provider() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("STORAGE_CONTAINER", "uploads"),
            ("STORAGE_ACCESS_KEY_ID", "key"),
            ("STORAGE_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.provider, Provider::S3);
        assert_eq!(config.container, "uploads");
        assert_eq!(config.timeout, Duration::from_secs(30));
        let s3 = config.s3.unwrap();
        assert_eq!(s3.region, "us-east-1");
        assert!(s3.endpoint.is_none());
    }

    #[test]
    fn s3_requires_credentials() {
        let err = StorageConfig::from_lookup(lookup(&[("STORAGE_CONTAINER", "uploads")]))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(ref msg) if msg.contains("STORAGE_ACCESS_KEY_ID")));
    }

    #[test]
    fn blank_container_counts_as_missing() {
        let err = StorageConfig::from_lookup(lookup(&[
            ("STORAGE_CONTAINER", "  "),
            ("STORAGE_ACCESS_KEY_ID", "key"),
            ("STORAGE_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(ref msg) if msg.contains("STORAGE_CONTAINER")));
    }

    #[test]
    fn memory_provider_needs_no_credentials() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("STORAGE_PROVIDER", "Memory"),
            ("STORAGE_TIMEOUT_SECS", "5"),
            ("STORAGE_PUBLIC_URL", "http://localhost:8080/blobs/"),
        ]))
        .unwrap();

        assert_eq!(config.provider, Provider::Memory);
        assert_eq!(config.container, "files");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.public_url.as_deref(), Some("http://localhost:8080/blobs"));
        assert!(config.s3.is_none());
    }

    #[test]
    fn rejects_unknown_provider_and_bad_timeout() {
        assert!(StorageConfig::from_lookup(lookup(&[("STORAGE_PROVIDER", "ftp")])).is_err());
        assert!(StorageConfig::from_lookup(lookup(&[
            ("STORAGE_PROVIDER", "memory"),
            ("STORAGE_TIMEOUT_SECS", "soon"),
        ]))
        .is_err());
    }
}
