pub mod blob_dto;
