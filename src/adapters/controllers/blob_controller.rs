use std::sync::atomic::{AtomicU16, Ordering};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::{
    adapters::state::AppState,
    application::{dto::blob_dto::BlobDto, error::ApplicationError},
    domain::models::blob::{UploadData, DEFAULT_CONTENT_TYPE},
};

const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> ApplicationError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApplicationError::PayloadTooLarge
    } else {
        warn!("Invalid multipart data: {}", e);
        ApplicationError::BadRequest("Invalid request format".to_string())
    }
}

pub struct BlobController;

impl BlobController {
    /// GET /api/files
    pub async fn list_files(
        State(app_state): State<AppState>,
    ) -> Result<Json<Vec<BlobDto>>, ApplicationError> {
        let files = app_state.blob_service.list().await?;
        info!("Listed {} files", files.len());
        Ok(Json(files))
    }

    /// POST /api/files/Upload
    ///
    /// Streams the `file` part straight into the container. Business failures
    /// (conflicts, backend faults) answer 500 with the plain status text.
    pub async fn upload_file(
        State(app_state): State<AppState>,
        mut multipart: Multipart,
    ) -> Result<Response, ApplicationError> {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            // The key is the name exactly as supplied; blank names are rejected
            let filename = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    warn!("Upload part has no filename");
                    ApplicationError::BadRequest("Missing file name".to_string())
                })?;
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();

            // Status of the first multipart error seen while streaming, 0 if none
            let body_error = AtomicU16::new(0);
            let body = field
                .inspect_err(|e| {
                    warn!("Upload body failed: {}", e);
                    let _ = body_error.compare_exchange(
                        0,
                        e.status().as_u16(),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    );
                })
                .map_err(std::io::Error::other)
                .boxed();

            let response = app_state
                .blob_service
                .upload(UploadData::new(filename, content_type, body))
                .await;

            match body_error.load(Ordering::Relaxed) {
                0 => {}
                413 => return Err(ApplicationError::PayloadTooLarge),
                _ => {
                    return Err(ApplicationError::BadRequest(
                        "Invalid file data".to_string(),
                    ))
                }
            }

            return Ok(if response.error {
                (StatusCode::INTERNAL_SERVER_ERROR, response.status).into_response()
            } else {
                (StatusCode::OK, Json(response)).into_response()
            });
        }

        warn!("Missing required '{}' field in upload", FILE_FIELD);
        Err(ApplicationError::BadRequest(
            "Missing required field 'file'".to_string(),
        ))
    }
}
