//! Local file storage for uploads and avatars
//!
//! Files live under the uploads directory and are served back at `/uploads`.

use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// URL prefix under which stored files are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const AVATARS_DIR: &str = "avatars";
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    pub upload_dir: PathBuf,
}

/// A file written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name on disk, `<uuid><ext>` for uploads
    pub stored_name: String,
    /// Public URL, e.g. `/uploads/<stored_name>`
    pub url: String,
}

impl LocalFileStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Save an uploaded resource file under a fresh unique name
    pub async fn save_upload(
        &self,
        file_bytes: Bytes,
        original_filename: Option<&str>,
    ) -> Result<StoredFile, std::io::Error> {
        let stored_name = format!("{}{}", Uuid::new_v4(), extension_of(original_filename));

        fs::create_dir_all(&self.upload_dir).await?;
        fs::write(self.upload_dir.join(&stored_name), file_bytes).await?;

        Ok(StoredFile {
            url: format!("{}/{}", UPLOADS_URL_PREFIX, stored_name),
            stored_name,
        })
    }

    /// Save an avatar named after its owner (user or professor), replacing any previous one
    pub async fn save_avatar(
        &self,
        owner_id: Uuid,
        file_bytes: Bytes,
        original_filename: Option<&str>,
    ) -> Result<StoredFile, std::io::Error> {
        let stored_name = format!("{}{}", owner_id, extension_of(original_filename));
        let dir = self.upload_dir.join(AVATARS_DIR);

        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&stored_name), file_bytes).await?;

        Ok(StoredFile {
            url: format!("{}/{}/{}", UPLOADS_URL_PREFIX, AVATARS_DIR, stored_name),
            stored_name,
        })
    }

    /// Best-effort removal of a stored file by its public URL
    pub async fn remove(&self, url: &str) {
        let Some(relative) = url.strip_prefix(UPLOADS_URL_PREFIX) else {
            return;
        };
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return;
        }

        if let Err(e) = fs::remove_file(self.upload_dir.join(relative)).await {
            warn!(url = %url, error = %e, "Failed to remove stored file");
        }
    }
}

/// `.ext` of the original filename, lowercased; empty when missing or unusual
fn extension_of(original_filename: Option<&str>) -> String {
    original_filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Some("notes.PDF")), ".pdf");
        assert_eq!(extension_of(Some("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Some("README")), "");
        assert_eq!(extension_of(Some("evil.p/hp")), "");
        assert_eq!(extension_of(None), "");
    }

    #[tokio::test]
    async fn test_save_upload_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));

        let stored = storage
            .save_upload(Bytes::from_static(b"hello"), Some("lista.pdf"))
            .await
            .unwrap();
        assert!(stored.stored_name.ends_with(".pdf"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.stored_name));

        let on_disk = dir.path().join("uploads").join(&stored.stored_name);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"hello");

        storage.remove(&stored.url).await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_avatar_named_after_owner() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        let owner = Uuid::new_v4();

        let stored = storage
            .save_avatar(owner, Bytes::from_static(b"png"), Some("me.png"))
            .await
            .unwrap();
        assert_eq!(stored.url, format!("/uploads/avatars/{}.png", owner));
        assert!(dir.path().join("avatars").join(format!("{}.png", owner)).exists());
    }

    #[tokio::test]
    async fn test_remove_ignores_paths_outside_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("secret.txt");
        std::fs::write(&outside, b"keep").unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));

        storage.remove("/uploads/../secret.txt").await;
        storage.remove("/elsewhere/secret.txt").await;
        assert!(outside.exists());
    }
}
