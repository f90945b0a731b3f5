use axum::extract::Multipart;

use crate::{
    audit,
    dto::upload::{RemovedFile, UploadedFile},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    response::{ApiResponse, Meta},
    state::AppState,
    storage::{FileStore, StagedFile, UploadReport, rollback, sanitize_folder, upload_all},
};

/// Parts of a multipart upload, fully read into memory before any storage call.
#[derive(Debug, Default)]
pub struct StagedUpload {
    pub folder: String,
    pub watermark: bool,
    pub files: Vec<StagedFile>,
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Reads `file`/`files` parts plus the `folder` and `watermark` text fields.
pub async fn read_multipart(mut multipart: Multipart) -> AppResult<StagedUpload> {
    let mut folder_hint: Option<String> = None;
    let mut watermark = false;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" | "files[]" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::BadRequest("file part has no file name".into()))?;
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                files.push(StagedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "folder" => folder_hint = Some(field.text().await?),
            "watermark" => watermark = parse_flag(&field.text().await?),
            other => tracing::debug!(field = other, "ignoring multipart field"),
        }
    }

    Ok(StagedUpload {
        folder: sanitize_folder(folder_hint.as_deref()),
        watermark,
        files,
    })
}

pub async fn upload_file(
    state: &AppState,
    user: &AuthUser,
    upload: StagedUpload,
) -> AppResult<ApiResponse<UploadedFile>> {
    ensure_staff(user)?;
    let mut files = upload.files;
    if files.len() != 1 {
        return Err(AppError::BadRequest("exactly one file is required".into()));
    }
    let file = files.remove(0);
    crate::storage::image_extension(&file.file_name, file.content_type.as_deref())?;

    let stored = state
        .store
        .put(&upload.folder, &file.file_name, file.bytes)
        .await?;

    audit::record(
        state,
        user,
        "file_upload",
        "uploads",
        serde_json::json!({ "url": stored.url, "watermark": upload.watermark }),
    )
    .await;

    Ok(ApiResponse::success(
        "Uploaded",
        UploadedFile {
            url: stored.url,
            folder: stored.folder,
            file_name: stored.file_name,
            size: stored.size,
            watermark: upload.watermark,
        },
        Some(Meta::empty()),
    ))
}

/// Uploads every file; keeps them only if all succeeded.
pub async fn upload_batch(
    state: &AppState,
    user: &AuthUser,
    upload: StagedUpload,
) -> AppResult<ApiResponse<UploadReport>> {
    ensure_staff(user)?;
    if upload.files.is_empty() {
        return Err(AppError::BadRequest("no files in upload".into()));
    }
    let store = state.store.as_ref();
    let mut report = upload_all(store, &upload.folder, upload.files).await;

    let message = if report.all_succeeded() {
        report.committed = true;
        "Uploaded"
    } else {
        rollback(store, &mut report).await;
        if report.leftovers.is_empty() {
            "Upload failed, nothing kept"
        } else {
            "Upload failed, some files could not be removed"
        }
    };

    Ok(ApiResponse::success(message, report, Some(Meta::empty())))
}

pub async fn delete_file(
    state: &AppState,
    user: &AuthUser,
    url: &str,
) -> AppResult<ApiResponse<RemovedFile>> {
    ensure_staff(user)?;
    if !state.store.remove(url).await? {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user,
        "file_delete",
        "uploads",
        serde_json::json!({ "url": url }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        RemovedFile {
            url: url.to_string(),
        },
        Some(Meta::empty()),
    ))
}

/// Deletes files that an entity no longer references. Returns the URLs that
/// could not be deleted; files already gone count as removed. URLs that do
/// not point into the store (external links) are skipped.
pub async fn remove_files(state: &AppState, urls: &[String]) -> Vec<String> {
    let mut failures = Vec::new();
    for url in urls {
        if state.store.path_for_url(url).is_err() {
            tracing::debug!(url = %url, "skipping removal of non-stored image");
            continue;
        }
        if let Err(err) = state.store.remove(url).await {
            tracing::warn!(url = %url, error = %err, "image cleanup failed");
            failures.push(url.clone());
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn watermark_flag_accepts_common_truthy_values() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" ON "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
