use aws_sdk_s3::{
    config::http::HttpResponse,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
};
use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob already exists: {0}")]
    AlreadyExists(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage provider error: {0}")]
    ProviderError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            other => ApplicationError::InternalError(format!("Storage error: {}", other)),
        }
    }
}

impl StorageError {
    /// Tags an S3 service response by HTTP status and error code.
    pub fn from_s3_response(key: &str, status: u16, code: Option<&str>, message: String) -> Self {
        match (status, code) {
            // HEAD responses carry no body, so a key-level 404 arrives without a code
            (_, Some("NoSuchKey" | "NotFound")) | (404, None) => {
                StorageError::NotFound(key.to_string())
            }
            // 409 is returned when a concurrent conditional write wins the race
            (_, Some("PreconditionFailed" | "ConditionalRequestConflict")) | (412 | 409, _) => {
                StorageError::AlreadyExists(key.to_string())
            }
            (401 | 403, _) => StorageError::Unauthorized(message),
            _ => StorageError::ProviderError(message),
        }
    }

    pub fn from_s3<E>(key: &str, error: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        match &error {
            SdkError::ServiceError(context) => {
                let status = context.raw().status().as_u16();
                let code = context.err().code().map(str::to_string);
                StorageError::from_s3_response(
                    key,
                    status,
                    code.as_deref(),
                    DisplayErrorContext(&error).to_string(),
                )
            }
            SdkError::TimeoutError(_) => StorageError::NetworkError("Request timeout".to_string()),
            SdkError::DispatchFailure(failure) => {
                StorageError::NetworkError(format!("Connection failed: {:?}", failure))
            }
            _ => StorageError::ProviderError(DisplayErrorContext(&error).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_not_found() {
        let err = StorageError::from_s3_response("a.txt", 404, Some("NoSuchKey"), String::new());
        assert!(matches!(err, StorageError::NotFound(ref key) if key == "a.txt"));

        let err = StorageError::from_s3_response("a.txt", 404, None, String::new());
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn missing_bucket_is_a_fault_not_a_missing_key() {
        let err = StorageError::from_s3_response(
            "a.txt",
            404,
            Some("NoSuchBucket"),
            "bucket does not exist".to_string(),
        );
        assert!(matches!(err, StorageError::ProviderError(ref msg) if msg == "bucket does not exist"));
    }

    #[test]
    fn failed_preconditions_are_conflicts() {
        let err =
            StorageError::from_s3_response("a.txt", 412, Some("PreconditionFailed"), String::new());
        assert!(matches!(err, StorageError::AlreadyExists(ref key) if key == "a.txt"));

        let err = StorageError::from_s3_response(
            "a.txt",
            409,
            Some("ConditionalRequestConflict"),
            String::new(),
        );
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn other_statuses_keep_the_message() {
        let err = StorageError::from_s3_response(
            "a.txt",
            403,
            Some("AccessDenied"),
            "access denied".to_string(),
        );
        assert!(matches!(err, StorageError::Unauthorized(ref msg) if msg == "access denied"));

        let err =
            StorageError::from_s3_response("a.txt", 500, Some("InternalError"), "boom".to_string());
        assert!(matches!(err, StorageError::ProviderError(ref msg) if msg == "boom"));
    }

    #[test]
    fn only_not_found_keeps_its_meaning_in_the_application_layer() {
        assert!(matches!(
            ApplicationError::from(StorageError::NotFound("a".to_string())),
            ApplicationError::NotFound
        ));
        assert!(matches!(
            ApplicationError::from(StorageError::NetworkError("down".to_string())),
            ApplicationError::InternalError(ref msg) if msg.contains("down")
        ));
    }
}
