use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::{page_bounds, read_files};
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::StoredFile;
use crate::entities::{prelude::*, submissions};
use crate::services::brief_workflow::ensure_accepting_submissions;
use crate::services::ownership::not_owner;
use crate::services::submission_service::{SubmissionChanges, find_brief, find_submission};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: String,
    pub brief_id: String,
    pub user_id: String,
    pub description: String,
    pub files: Vec<StoredFile>,
    pub is_finalist: bool,
    pub is_winner: bool,
    pub likes: i32,
    pub votes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<submissions::Model> for SubmissionResponse {
    fn from(s: submissions::Model) -> Self {
        Self {
            id: s.id,
            brief_id: s.brief_id,
            user_id: s.user_id,
            description: s.description,
            files: s.files.0,
            is_finalist: s.is_finalist,
            is_winner: s.is_winner,
            likes: s.likes,
            votes: s.votes,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateSubmissionRequest {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: String,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateSubmissionRequest {
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// Replaces the whole file list
    pub files: Option<Vec<StoredFile>>,
}

#[derive(Deserialize, IntoParams)]
pub struct SubmissionQuery {
    pub brief_id: Option<String>,
    pub user_id: Option<String>,
    pub is_finalist: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn query_submissions(
    state: &AppState,
    query: SubmissionQuery,
) -> Result<Vec<SubmissionResponse>, AppError> {
    let mut select = Submissions::find();
    if let Some(brief_id) = &query.brief_id {
        select = select.filter(submissions::Column::BriefId.eq(brief_id.as_str()));
    }
    if let Some(user_id) = &query.user_id {
        select = select.filter(submissions::Column::UserId.eq(user_id.as_str()));
    }
    if let Some(is_finalist) = query.is_finalist {
        select = select.filter(submissions::Column::IsFinalist.eq(is_finalist));
    }

    let (offset, limit) = page_bounds(query.page, query.per_page);
    let rows = select
        .order_by_desc(submissions::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/submissions",
    params(SubmissionQuery),
    responses((status = 200, description = "Submissions", body = [SubmissionResponse])),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    Ok(Json(query_submissions(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 404, description = "Submission not found")
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionResponse>, AppError> {
    Ok(Json(find_submission(&state.db, &id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/submissions/{id}",
    params(("id" = String, Path, description = "Submission id")),
    request_body = UpdateSubmissionRequest,
    responses(
        (status = 200, description = "Submission updated", body = SubmissionResponse),
        (status = 403, description = "Only the author may edit"),
        (status = 409, description = "Brief no longer accepts submissions")
    ),
    security(("jwt" = [])),
    tag = "submissions"
)]
pub async fn update_submission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSubmissionRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    payload.validate()?;
    let submission = state
        .submissions
        .update(
            &id,
            &user,
            SubmissionChanges {
                description: payload.description,
                files: payload.files,
            },
        )
        .await?;
    Ok(Json(submission.into()))
}

#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 403, description = "Neither author nor admin")
    ),
    security(("jwt" = [])),
    tag = "submissions"
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.submissions.delete(&id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/files",
    params(("id" = String, Path, description = "Submission id")),
    request_body(content = Object, description = "One or more files", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files appended", body = SubmissionResponse),
        (status = 403, description = "Only the author may upload"),
        (status = 413, description = "Too many or too large files"),
        (status = 415, description = "File type not allowed")
    ),
    security(("jwt" = [])),
    tag = "submissions"
)]
pub async fn upload_submission_files(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, AppError> {
    // Check authorship and the gate before pushing anything to storage
    let submission = find_submission(&state.db, &id).await?;
    if submission.user_id != user.id {
        return Err(not_owner("submission"));
    }
    let brief = find_brief(&state.db, &submission.brief_id).await?;
    ensure_accepting_submissions(&brief, Utc::now())?;

    let incoming = read_files(&mut multipart, state.uploads.max_files()).await?;
    let stored = state.uploads.store_many(&user.id, incoming).await?;
    match state.submissions.append_files(&id, &user, stored.clone()).await {
        Ok(updated) => Ok(Json(updated.into())),
        Err(e) => {
            state.uploads.discard(&user.id, &stored).await;
            Err(e)
        }
    }
}
