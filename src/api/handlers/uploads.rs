use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::read_files;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::StoredFile;
use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct Base64UploadRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Overrides the type carried by a data URL
    pub content_type: Option<String>,
    /// Raw base64 or `data:<mime>;base64,<payload>`
    #[validate(length(min = 1))]
    pub data: String,
}

#[utoipa::path(
    post,
    path = "/api/uploads",
    request_body(content = Object, description = "Up to `storage.max_files` files", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Files stored", body = [StoredFile]),
        (status = 400, description = "No files or invalid file name"),
        (status = 413, description = "Too many or too large files"),
        (status = 415, description = "File type not allowed")
    ),
    security(("jwt" = [])),
    tag = "uploads"
)]
pub async fn upload_files(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<StoredFile>>), AppError> {
    let incoming = read_files(&mut multipart, state.uploads.max_files()).await?;
    let stored = state.uploads.store_many(&user.id, incoming).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    post,
    path = "/api/uploads/base64",
    request_body = Base64UploadRequest,
    responses(
        (status = 201, description = "File stored", body = StoredFile),
        (status = 400, description = "Invalid payload"),
        (status = 413, description = "File too large"),
        (status = 415, description = "File type not allowed")
    ),
    security(("jwt" = [])),
    tag = "uploads"
)]
pub async fn upload_base64(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<Base64UploadRequest>,
) -> Result<(StatusCode, Json<StoredFile>), AppError> {
    payload.validate()?;
    let stored = state
        .uploads
        .store_base64(&user.id, &payload.filename, payload.content_type, &payload.data)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}
