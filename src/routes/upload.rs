use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::upload::{BatchUploadForm, DeleteUploadRequest, RemovedFile, UploadForm, UploadedFile},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::upload_service,
    state::AppState,
    storage::UploadReport,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_file).delete(delete_file))
        .route("/batch", post(upload_batch))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored file", body = ApiResponse<UploadedFile>),
        (status = 400, description = "Missing file or not an image")
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedFile>>> {
    let upload = upload_service::read_multipart(multipart).await?;
    let resp = upload_service::upload_file(&state, &user, upload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/upload/batch",
    request_body(content = BatchUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Every file stored", body = ApiResponse<UploadReport>),
        (status = 422, description = "Some files failed; none kept", body = ApiResponse<UploadReport>)
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload_batch(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadReport>>)> {
    let upload = upload_service::read_multipart(multipart).await?;
    let resp = upload_service::upload_batch(&state, &user, upload).await?;
    let status = match resp.data.as_ref() {
        Some(report) if report.committed => StatusCode::OK,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/upload",
    request_body = DeleteUploadRequest,
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<RemovedFile>),
        (status = 404, description = "No such file")
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DeleteUploadRequest>,
) -> AppResult<Json<ApiResponse<RemovedFile>>> {
    let resp = upload_service::delete_file(&state, &user, &payload.url).await?;
    Ok(Json(resp))
}
