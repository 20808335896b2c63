use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

/// Chunked object payload, used for both uploads and downloads.
pub type BlobBody<'a> = BoxStream<'a, io::Result<Bytes>>;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object as reported by a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: Option<String>,
}

/// A named payload waiting to be written to the container.
pub struct UploadData<'a> {
    pub filename: String,
    pub content_type: String,
    pub body: BlobBody<'a>,
}

impl<'a> UploadData<'a> {
    pub fn new(filename: String, content_type: String, body: BlobBody<'a>) -> Self {
        Self {
            filename,
            content_type,
            body,
        }
    }
}

/// The readable content of a stored object.
pub struct ObjectContent {
    pub content_type: Option<String>,
    pub body: BlobBody<'static>,
}
