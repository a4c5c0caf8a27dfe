use crate::domain::repository::ImageStorage;
use crate::error::StoreError;

pub const MAX_FILES: usize = 8;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// One file taken from a multipart upload.
#[derive(Debug)]
pub struct UploadFile {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// File extension for an accepted image content type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

// ── UploadImages ─────────────────────────────────────────────────────────────

pub struct UploadImagesUseCase<S: ImageStorage> {
    pub storage: S,
}

impl<S: ImageStorage> UploadImagesUseCase<S> {
    /// Validate every file, then store them; returns public URLs in input order.
    pub async fn execute(&self, files: Vec<UploadFile>) -> Result<Vec<String>, StoreError> {
        if files.is_empty() {
            return Err(StoreError::InvalidUpload("no image files provided".to_owned()));
        }
        if files.len() > MAX_FILES {
            return Err(StoreError::InvalidUpload(format!(
                "at most {MAX_FILES} images per upload"
            )));
        }
        let mut accepted = Vec::with_capacity(files.len());
        for file in &files {
            let ext = file
                .content_type
                .as_deref()
                .and_then(image_extension)
                .ok_or_else(|| {
                    StoreError::InvalidUpload(
                        "only jpeg, png, webp and gif images are allowed".to_owned(),
                    )
                })?;
            if file.bytes.is_empty() {
                return Err(StoreError::InvalidUpload("empty file".to_owned()));
            }
            if file.bytes.len() > MAX_FILE_BYTES {
                return Err(StoreError::InvalidUpload(
                    "each image must be at most 5 MiB".to_owned(),
                ));
            }
            accepted.push((ext, file.bytes.as_slice()));
        }

        let mut urls = Vec::with_capacity(accepted.len());
        for (ext, bytes) in accepted {
            match self.storage.save(ext, bytes).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    for url in &urls {
                        if let Err(cleanup) = self.storage.remove(url).await {
                            tracing::warn!(error = %cleanup, url, "failed to remove partial upload");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(urls)
    }
}
