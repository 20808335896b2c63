use serde::Serialize;

use crate::domain::models::blob::{BlobBody, StoredObject};

#[derive(Serialize)]
pub struct BlobDto {
    #[serde(rename = "Uri")]
    pub uri: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ContentType")]
    pub content_type: Option<String>,
    /// Only set for downloads.
    #[serde(skip)]
    pub content: Option<BlobBody<'static>>,
}

impl BlobDto {
    pub fn from_object(container_uri: &str, object: StoredObject) -> Self {
        Self {
            uri: blob_uri(container_uri, &object.key),
            name: object.key,
            content_type: object.content_type,
            content: None,
        }
    }
}

impl std::fmt::Debug for BlobDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobDto")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("content", &self.content.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlobRefDto {
    #[serde(rename = "Uri")]
    pub uri: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Outcome of an upload or delete. `blob` stays empty unless an upload succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlobResponseDto {
    #[serde(rename = "Error")]
    pub error: bool,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Blob")]
    pub blob: BlobRefDto,
}

impl BlobResponseDto {
    pub fn success(status: String) -> Self {
        Self {
            error: false,
            status,
            blob: BlobRefDto::default(),
        }
    }

    pub fn uploaded(status: String, uri: String, name: String) -> Self {
        Self {
            error: false,
            status,
            blob: BlobRefDto { uri, name },
        }
    }

    pub fn failure(status: String) -> Self {
        Self {
            error: true,
            status,
            blob: BlobRefDto::default(),
        }
    }
}

pub fn blob_uri(container_uri: &str, name: &str) -> String {
    format!("{}/{}", container_uri, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_fields() {
        let response = BlobResponseDto::uploaded(
            "File a.txt Uploaded Successfully".to_string(),
            "memory://files/a.txt".to_string(),
            "a.txt".to_string(),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Error": false,
                "Status": "File a.txt Uploaded Successfully",
                "Blob": { "Uri": "memory://files/a.txt", "Name": "a.txt" }
            })
        );
    }

    #[test]
    fn listing_entries_never_serialize_content() {
        let dto = BlobDto::from_object(
            "memory://files",
            StoredObject {
                key: "report.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
            },
        );

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Uri": "memory://files/report.pdf",
                "Name": "report.pdf",
                "ContentType": "application/pdf"
            })
        );
    }

    #[test]
    fn failures_leave_the_blob_empty() {
        let response = BlobResponseDto::failure("File with name a.txt not found.".to_string());
        assert!(response.error);
        assert_eq!(response.blob, BlobRefDto::default());
    }
}
