pub mod blob_controller;
pub mod health_controller;
