use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

use super::{FileStore, StoredFile, image_extension, sanitize_folder};
use crate::error::{AppError, AppResult};

/// Stores files under `root/<folder>/<uuid>.<ext>` and serves them at
/// `<base_url>/uploads/<folder>/<file>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    base_url: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_prefix(&self) -> String {
        format!("{}/uploads/", self.base_url)
    }

    /// Maps a public URL back to a path inside the store root. Anything
    /// outside the uploads prefix or climbing out of the root is rejected.
    pub fn path_for_url(&self, url: &str) -> AppResult<PathBuf> {
        let relative = url
            .strip_prefix(&self.url_prefix())
            .ok_or_else(|| AppError::BadRequest("url is not a stored upload".into()))?;
        let relative = Path::new(relative);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !clean || relative.components().count() != 2 {
            return Err(AppError::BadRequest("url is not a stored upload".into()));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalStore {
    async fn put(&self, folder: &str, original_name: &str, bytes: Bytes) -> AppResult<StoredFile> {
        let ext = image_extension(original_name, None)?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest(format!("{original_name}: file is empty")));
        }
        let folder = sanitize_folder(Some(folder));
        let dir = self.root.join(&folder);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let size = bytes.len() as u64;
        fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::debug!(folder = %folder, file_name = %file_name, size, "stored upload");
        Ok(StoredFile {
            url: format!("{}{folder}/{file_name}", self.url_prefix()),
            folder,
            file_name,
            size,
        })
    }

    async fn remove(&self, url: &str) -> AppResult<bool> {
        let path = self.path_for_url(url)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(AppError::Storage(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalStore {
        let root = std::env::temp_dir().join(format!("rental-store-{}", Uuid::new_v4()));
        LocalStore::new(root, "http://cdn.test/")
    }

    #[tokio::test]
    async fn put_then_remove_round_trip_on_disk() {
        let store = temp_store();
        let stored = store
            .put("products", "truss.png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();
        assert!(stored.url.starts_with("http://cdn.test/uploads/products/"));
        assert!(stored.url.ends_with(".png"));
        assert_eq!(stored.size, 4);

        let path = store.path_for_url(&stored.url).unwrap();
        assert!(path.exists());
        assert!(store.remove(&stored.url).await.unwrap());
        assert!(!path.exists());
        assert!(!store.remove(&stored.url).await.unwrap());

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn empty_files_are_rejected() {
        let store = temp_store();
        let err = store.put("general", "a.jpg", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn foreign_and_traversal_urls_are_rejected() {
        let store = temp_store();
        assert!(store.path_for_url("http://other.test/uploads/a/b.jpg").is_err());
        assert!(store.path_for_url("http://cdn.test/uploads/../secret.jpg").is_err());
        assert!(store.path_for_url("http://cdn.test/uploads/a/../../b.jpg").is_err());
        assert!(store.path_for_url("http://cdn.test/uploads/b.jpg").is_err());
        assert!(store.path_for_url("http://cdn.test/uploads/products/b.jpg").is_ok());
    }
}
