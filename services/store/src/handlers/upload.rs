use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;

use neurarig_auth_types::identity::Identity;

use crate::error::StoreError;
use crate::handlers::require_admin;
use crate::state::AppState;
use crate::usecase::upload::{MAX_FILES, UploadFile, UploadImagesUseCase};

/// Multipart field names accepted as image files.
const IMAGE_FIELDS: [&str; 2] = ["images", "image"];

#[derive(Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

// ── POST /api/uploads ────────────────────────────────────────────────────────

pub async fn upload_images(
    identity: Identity,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), StoreError> {
    require_admin(&identity)?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !field.name().is_some_and(|n| IMAGE_FIELDS.contains(&n)) {
            continue;
        }
        if files.len() == MAX_FILES {
            return Err(StoreError::InvalidUpload(format!(
                "at most {MAX_FILES} images per upload"
            )));
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        files.push(UploadFile {
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let usecase = UploadImagesUseCase {
        storage: state.image_storage(),
    };
    let urls = usecase.execute(files).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { urls })))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> StoreError {
    StoreError::InvalidUpload(e.body_text())
}
