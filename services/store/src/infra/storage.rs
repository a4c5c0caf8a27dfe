use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::repository::ImageStorage;
use crate::error::StoreError;

/// URL path the upload directory is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Images written to a local directory and served statically.
#[derive(Clone)]
pub struct LocalImageStorage {
    pub dir: PathBuf,
}

impl LocalImageStorage {
    /// File name inside the upload directory for a URL this storage issued.
    fn file_name(url: &str) -> Option<&str> {
        let name = url.strip_prefix(UPLOADS_URL_PREFIX)?.strip_prefix('/')?;
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        valid.then_some(name)
    }
}

impl ImageStorage for LocalImageStorage {
    async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let file_name = format!("{}.{extension}", Uuid::now_v7());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        Ok(format!("{UPLOADS_URL_PREFIX}/{file_name}"))
    }

    async fn remove(&self, url: &str) -> Result<(), StoreError> {
        let Some(file_name) = Self::file_name(url) else {
            return Ok(());
        };
        let path = self.dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove upload {}", path.display()))
                .into()),
        }
    }
}
