mod blob_service;
mod blob_store;

pub use blob_service::BlobService;
pub use blob_store::BlobStore;
