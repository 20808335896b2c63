//! HTTP façade over a single blob container: list, upload, download and delete
//! files, with backend outcomes mapped onto a small DTO contract.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod services;
