//! File storage for uploaded images.

pub mod batch;
pub mod local;

pub use batch::{StagedFile, UploadOutcome, UploadReport, rollback, upload_all};
pub use local::LocalStore;

use axum::body::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub url: String,
    pub folder: String,
    pub file_name: String,
    pub size: u64,
}

/// Where uploaded bytes end up. URLs returned by `put` are the only handle
/// callers keep; `remove` takes the same URL back.
#[allow(async_fn_in_trait)]
pub trait FileStore {
    async fn put(&self, folder: &str, original_name: &str, bytes: Bytes) -> AppResult<StoredFile>;

    /// Deletes the file behind `url`. Returns `false` when nothing was stored there.
    async fn remove(&self, url: &str) -> AppResult<bool>;
}

/// Reduces a client folder hint to `[a-z0-9_-]`, defaulting to `general`.
pub fn sanitize_folder(hint: Option<&str>) -> String {
    let folder: String = hint
        .unwrap_or_default()
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect();
    if folder.is_empty() {
        "general".to_string()
    } else {
        folder
    }
}

/// Lowercase image extension of `file_name`, or a validation error.
pub fn image_extension(file_name: &str, content_type: Option<&str>) -> AppResult<String> {
    if let Some(ct) = content_type {
        if !ct.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "{file_name}: only image uploads are accepted"
            )));
        }
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(format!(
            "{file_name}: unsupported image extension"
        )))
    }
}
