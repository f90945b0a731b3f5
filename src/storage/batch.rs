//! Multi-file uploads with an explicit commit decision.
//!
//! Every staged file is attempted, each outcome is reported, and the caller
//! decides whether to attach the URLs or undo the successful uploads.

use axum::body::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

use super::FileStore;

#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub file_name: String,
    pub url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
    /// Set once the uploaded URLs have been attached to their owner.
    pub committed: bool,
    /// URLs a rollback could not delete. They are still in the store.
    pub leftovers: Vec<String>,
}

impl UploadReport {
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.error.is_none())
    }

    pub fn urls(&self) -> Vec<String> {
        self.outcomes.iter().filter_map(|o| o.url.clone()).collect()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

/// Uploads every staged file in order, collecting a per-file outcome.
/// A failure does not stop the remaining files.
pub async fn upload_all<S: FileStore>(store: &S, folder: &str, files: Vec<StagedFile>) -> UploadReport {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let checked = super::image_extension(&file.file_name, file.content_type.as_deref());
        let result = match checked {
            Ok(_) => store.put(folder, &file.file_name, file.bytes).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(stored) => outcomes.push(UploadOutcome {
                file_name: file.file_name,
                url: Some(stored.url),
                error: None,
            }),
            Err(err) => {
                tracing::warn!(file = %file.file_name, error = %err, "upload failed");
                outcomes.push(UploadOutcome {
                    file_name: file.file_name,
                    url: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    UploadReport {
        outcomes,
        committed: false,
        leftovers: Vec::new(),
    }
}

/// Deletes the files a partial batch did store. Removed outcomes lose their
/// URL; files that could not be deleted are listed in `leftovers`.
pub async fn rollback<S: FileStore>(store: &S, report: &mut UploadReport) {
    report.committed = false;
    for outcome in report.outcomes.iter_mut() {
        let Some(url) = outcome.url.take() else {
            continue;
        };
        if let Err(err) = store.remove(&url).await {
            tracing::warn!(url = %url, error = %err, "could not roll back upload");
            report.leftovers.push(url.clone());
            outcome.url = Some(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{AppError, AppResult},
        storage::StoredFile,
    };
    use std::sync::Mutex;

    /// Keeps URLs in memory and refuses file names containing "fail".
    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<Vec<String>>,
    }

    impl FileStore for MemoryStore {
        async fn put(&self, folder: &str, original_name: &str, bytes: Bytes) -> AppResult<StoredFile> {
            if original_name.contains("fail") {
                return Err(AppError::Storage("disk full".into()));
            }
            let url = format!("/uploads/{folder}/{original_name}");
            self.files.lock().unwrap().push(url.clone());
            Ok(StoredFile {
                url,
                folder: folder.to_string(),
                file_name: original_name.to_string(),
                size: bytes.len() as u64,
            })
        }

        async fn remove(&self, url: &str) -> AppResult<bool> {
            let mut files = self.files.lock().unwrap();
            let before = files.len();
            files.retain(|u| u != url);
            Ok(files.len() != before)
        }
    }

    fn staged(name: &str) -> StagedFile {
        StagedFile {
            file_name: name.to_string(),
            content_type: Some("image/jpeg".into()),
            bytes: Bytes::from_static(b"jpeg"),
        }
    }

    #[tokio::test]
    async fn every_file_is_attempted_and_reported() {
        let store = MemoryStore::default();
        let report = upload_all(
            &store,
            "products",
            vec![staged("a.jpg"), staged("fail.jpg"), staged("c.jpg")],
        )
        .await;

        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.all_succeeded());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[1].url, None);
        assert!(report.outcomes[1].error.as_deref().unwrap().contains("disk full"));
        assert_eq!(
            report.urls(),
            vec!["/uploads/products/a.jpg".to_string(), "/uploads/products/c.jpg".to_string()]
        );
        assert!(!report.committed);
    }

    #[tokio::test]
    async fn rollback_removes_the_successful_part_of_a_batch() {
        let store = MemoryStore::default();
        let mut report =
            upload_all(&store, "products", vec![staged("a.jpg"), staged("fail.jpg")]).await;
        assert_eq!(store.files.lock().unwrap().len(), 1);

        rollback(&store, &mut report).await;
        assert!(report.leftovers.is_empty());
        assert!(report.urls().is_empty());
        assert!(store.files.lock().unwrap().is_empty());
    }

    /// Accepts every upload but cannot delete anything.
    #[derive(Default)]
    struct StickyStore;

    impl FileStore for StickyStore {
        async fn put(&self, folder: &str, original_name: &str, bytes: Bytes) -> AppResult<StoredFile> {
            Ok(StoredFile {
                url: format!("/uploads/{folder}/{original_name}"),
                folder: folder.to_string(),
                file_name: original_name.to_string(),
                size: bytes.len() as u64,
            })
        }

        async fn remove(&self, _url: &str) -> AppResult<bool> {
            Err(AppError::Storage("read-only volume".into()))
        }
    }

    #[tokio::test]
    async fn rollback_reports_files_it_could_not_delete() {
        let store = StickyStore;
        let mut report = upload_all(&store, "products", vec![staged("a.jpg"), staged("b.jpg")]).await;

        rollback(&store, &mut report).await;
        assert_eq!(
            report.leftovers,
            vec!["/uploads/products/a.jpg".to_string(), "/uploads/products/b.jpg".to_string()]
        );
        assert_eq!(report.urls(), report.leftovers);
        assert!(!report.committed);
    }

    #[tokio::test]
    async fn non_images_fail_without_reaching_the_store() {
        let store = MemoryStore::default();
        let mut doc = staged("notes.txt");
        doc.content_type = Some("text/plain".into());
        let report = upload_all(&store, "general", vec![doc]).await;
        assert_eq!(report.failed(), 1);
        assert!(store.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_not_a_success() {
        let store = MemoryStore::default();
        let report = upload_all(&store, "general", vec![]).await;
        assert!(!report.all_succeeded());
    }
}
