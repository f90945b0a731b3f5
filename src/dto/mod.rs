use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod auth;
pub mod blogs;
pub mod categories;
pub mod events;
pub mod products;
pub mod promotions;
pub mod showcase;
pub mod upload;
pub mod users;

/// Result of a delete. `cleanup_failures` lists stored files that could not be removed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: Uuid,
    pub cleanup_failures: Vec<String>,
}

impl Deleted {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            cleanup_failures: Vec::new(),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// so updates can clear nullable columns.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
