//! Commit-on-save handling of an entity's image list.
//!
//! The client edits a draft: it keeps some stored URLs, reorders them and
//! appends freshly uploaded ones. Nothing is deleted from storage until the
//! owning entity has been saved with the new list.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Draft of an image list as submitted with an entity save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ImageDraft {
    /// Final ordered list of URLs to persist.
    pub images: Vec<String>,
    /// URLs the client explicitly dropped. Only those that were actually
    /// stored on the entity are deleted.
    #[serde(default)]
    pub removed: Vec<String>,
}

/// Result of comparing a draft against the persisted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChanges {
    pub images: Vec<String>,
    pub removed: Vec<String>,
}

impl ImageDraft {
    /// Computes the list to persist and the stored files to delete after saving.
    ///
    /// Anything present in `stored` but missing from the final list is removed,
    /// whether or not the client listed it in `removed`. Duplicates in the
    /// final list are collapsed, keeping the first position.
    pub fn plan(&self, stored: &[String]) -> ImageChanges {
        let mut images: Vec<String> = Vec::with_capacity(self.images.len());
        for url in &self.images {
            let url = url.trim();
            if !url.is_empty() && !images.iter().any(|u| u == url) {
                images.push(url.to_string());
            }
        }

        let mut removed: Vec<String> = stored
            .iter()
            .filter(|url| !images.contains(url))
            .cloned()
            .collect();
        for url in &self.removed {
            if stored.contains(url) && !images.contains(url) && !removed.contains(url) {
                removed.push(url.clone());
            }
        }

        ImageChanges { images, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dropped_stored_images_are_scheduled_for_removal() {
        let draft = ImageDraft {
            images: urls(&["/b.jpg", "/new.jpg"]),
            removed: urls(&["/a.jpg"]),
        };
        let changes = draft.plan(&urls(&["/a.jpg", "/b.jpg", "/c.jpg"]));
        assert_eq!(changes.images, urls(&["/b.jpg", "/new.jpg"]));
        assert_eq!(changes.removed, urls(&["/a.jpg", "/c.jpg"]));
    }

    #[test]
    fn removal_of_unknown_urls_is_ignored() {
        let draft = ImageDraft {
            images: urls(&["/a.jpg"]),
            removed: urls(&["/elsewhere.jpg"]),
        };
        let changes = draft.plan(&urls(&["/a.jpg"]));
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn kept_image_is_never_removed_even_if_flagged() {
        let draft = ImageDraft {
            images: urls(&["/a.jpg"]),
            removed: urls(&["/a.jpg"]),
        };
        let changes = draft.plan(&urls(&["/a.jpg"]));
        assert_eq!(changes.images, urls(&["/a.jpg"]));
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn reorder_and_duplicates_collapse() {
        let draft = ImageDraft {
            images: urls(&["/c.jpg", "/a.jpg", "/c.jpg", " "]),
            removed: vec![],
        };
        let changes = draft.plan(&urls(&["/a.jpg", "/c.jpg"]));
        assert_eq!(changes.images, urls(&["/c.jpg", "/a.jpg"]));
        assert!(changes.removed.is_empty());
    }
}
