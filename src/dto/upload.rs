use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart body of `POST /api/upload`. Documentation only; the handler
/// reads the parts directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Target folder hint, e.g. `products`.
    pub folder: Option<String>,
    /// `true` to request a watermark.
    pub watermark: Option<bool>,
}

/// Multipart body of the batch endpoints: repeated `files` parts.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct BatchUploadForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    pub files: Vec<Vec<u8>>,
    pub folder: Option<String>,
    pub watermark: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUploadRequest {
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub folder: String,
    pub file_name: String,
    pub size: u64,
    pub watermark: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedFile {
    pub url: String,
}
