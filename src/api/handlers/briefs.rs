use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::brands::find_brand;
use crate::api::handlers::{check_files, page_bounds};
use crate::api::handlers::submissions::{
    CreateSubmissionRequest, SubmissionQuery, SubmissionResponse, query_submissions,
};
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::{BriefStatus, FileList, StoredFile, TagSnapshot, TagSnapshots};
use crate::entities::{briefs, prelude::*, tags};
use crate::services::brief_workflow::{check_transition, ensure_same_brand, validate_terms};
use crate::services::ownership::{ensure_brand_manager, ensure_brief_manager};
use crate::services::submission_service::find_brief;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct BriefResponse {
    pub id: String,
    pub brand_id: String,
    pub created_by: String,
    pub title: String,
    pub description: String,
    pub is_paid: bool,
    pub prize_amount: Option<f64>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub status: BriefStatus,
    pub tags: Vec<TagSnapshot>,
    pub files: Vec<StoredFile>,
    pub submission_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<briefs::Model> for BriefResponse {
    fn from(brief: briefs::Model) -> Self {
        Self {
            id: brief.id,
            brand_id: brief.brand_id,
            created_by: brief.created_by,
            title: brief.title,
            description: brief.description,
            is_paid: brief.is_paid,
            prize_amount: brief.prize_amount,
            submission_deadline: brief.submission_deadline,
            voting_start: brief.voting_start,
            voting_end: brief.voting_end,
            status: brief.status,
            tags: brief.tags.0,
            files: brief.files.0,
            submission_count: brief.submission_count,
            created_at: brief.created_at,
            updated_at: brief.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateBriefRequest {
    /// Required on `POST /api/briefs`; must match the path under a brand
    pub brand_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub description: String,
    #[serde(default)]
    pub is_paid: bool,
    pub prize_amount: Option<f64>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    /// Defaults to `draft`
    pub status: Option<BriefStatus>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateBriefRequest {
    /// Immutable; a different value is rejected
    pub brand_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub is_paid: Option<bool>,
    pub prize_amount: Option<f64>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub status: Option<BriefStatus>,
    pub tag_ids: Option<Vec<String>>,
    pub files: Option<Vec<StoredFile>>,
}

#[derive(Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: BriefStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct FinalistsRequest {
    pub submission_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct WinnerRequest {
    pub submission_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct WinnerResponse {
    pub brief: BriefResponse,
    pub submission: SubmissionResponse,
}

#[derive(Deserialize, IntoParams)]
pub struct BriefQuery {
    pub status: Option<BriefStatus>,
    pub brand_id: Option<String>,
    /// Tag id or name
    pub tag: Option<String>,
    pub is_paid: Option<bool>,
    /// Substring of the title
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Snapshot the given tags by value. Unknown ids are rejected.
async fn resolve_tags(state: &AppState, ids: &[String]) -> Result<TagSnapshots, AppError> {
    let wanted: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(TagSnapshots::default());
    }

    let found = Tags::find()
        .filter(tags::Column::Id.is_in(wanted.iter().copied()))
        .order_by_asc(tags::Column::Name)
        .all(&state.db)
        .await?;

    if found.len() != wanted.len() {
        let missing: Vec<&str> = wanted
            .iter()
            .filter(|id| !found.iter().any(|t| t.id == **id))
            .copied()
            .collect();
        return Err(AppError::Validation(format!(
            "Unknown tag ids: {}",
            missing.join(", ")
        )));
    }

    Ok(TagSnapshots(
        found
            .into_iter()
            .map(|t| TagSnapshot {
                id: t.id,
                name: t.name,
            })
            .collect(),
    ))
}

/// Shared by `POST /api/briefs` and `POST /api/brands/{id}/briefs`.
pub async fn create_brief_in_brand(
    state: &AppState,
    user: &AuthUser,
    brand_id: &str,
    payload: CreateBriefRequest,
) -> Result<BriefResponse, AppError> {
    payload.validate()?;
    ensure_same_brand(brand_id, payload.brand_id.as_deref())?;

    let brand = find_brand(state, brand_id).await?;
    ensure_brand_manager(&brand.owner_id, user)?;

    validate_terms(
        payload.is_paid,
        payload.prize_amount,
        payload.voting_start,
        payload.voting_end,
    )?;
    check_files(state, &payload.files)?;

    let status = match payload.status {
        Some(status) => {
            check_transition(BriefStatus::Draft, status, user.role)?;
            status
        }
        None => BriefStatus::Draft,
    };
    let tags = resolve_tags(state, &payload.tag_ids).await?;

    let now = Utc::now();
    let brief = briefs::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        brand_id: Set(brand.id),
        created_by: Set(user.id.clone()),
        title: Set(payload.title),
        description: Set(payload.description),
        is_paid: Set(payload.is_paid),
        prize_amount: Set(payload.prize_amount),
        submission_deadline: Set(payload.submission_deadline),
        voting_start: Set(payload.voting_start),
        voting_end: Set(payload.voting_end),
        status: Set(status),
        tags: Set(tags),
        files: Set(FileList(payload.files)),
        submission_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!("📣 Brief {} created in brand {}", brief.id, brief.brand_id);
    Ok(brief.into())
}

pub async fn query_briefs(
    state: &AppState,
    query: BriefQuery,
) -> Result<Vec<BriefResponse>, AppError> {
    let mut select = Briefs::find();
    if let Some(status) = query.status {
        select = select.filter(briefs::Column::Status.eq(status));
    }
    if let Some(brand_id) = &query.brand_id {
        select = select.filter(briefs::Column::BrandId.eq(brand_id.as_str()));
    }
    if let Some(is_paid) = query.is_paid {
        select = select.filter(briefs::Column::IsPaid.eq(is_paid));
    }
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(briefs::Column::Title.contains(q));
    }
    let select = select.order_by_desc(briefs::Column::CreatedAt);
    let (offset, limit) = page_bounds(query.page, query.per_page);

    // Tag snapshots live in a JSON column, so the tag filter runs here
    let briefs = match query.tag.as_deref().filter(|t| !t.is_empty()) {
        Some(tag) => select
            .all(&state.db)
            .await?
            .into_iter()
            .filter(|b| b.tags.0.iter().any(|t| t.id == tag || t.name == tag))
            .skip(offset as usize)
            .take(limit as usize)
            .collect(),
        None => select.offset(offset).limit(limit).all(&state.db).await?,
    };

    Ok(briefs.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/briefs",
    params(BriefQuery),
    responses((status = 200, description = "Briefs", body = [BriefResponse])),
    tag = "briefs"
)]
pub async fn list_briefs(
    State(state): State<AppState>,
    Query(query): Query<BriefQuery>,
) -> Result<Json<Vec<BriefResponse>>, AppError> {
    Ok(Json(query_briefs(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/briefs/{id}",
    params(("id" = String, Path, description = "Brief id")),
    responses(
        (status = 200, description = "Brief", body = BriefResponse),
        (status = 404, description = "Brief not found")
    ),
    tag = "briefs"
)]
pub async fn get_brief(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BriefResponse>, AppError> {
    Ok(Json(find_brief(&state.db, &id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/briefs",
    request_body = CreateBriefRequest,
    responses(
        (status = 201, description = "Brief created", body = BriefResponse),
        (status = 400, description = "brand_id missing or invalid terms"),
        (status = 403, description = "Not the brand owner")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn create_brief(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateBriefRequest>,
) -> Result<(StatusCode, Json<BriefResponse>), AppError> {
    let brand_id = payload
        .brand_id
        .clone()
        .ok_or_else(|| AppError::Validation("brand_id is required".to_string()))?;
    let brief = create_brief_in_brand(&state, &user, &brand_id, payload).await?;
    Ok((StatusCode::CREATED, Json(brief)))
}

#[utoipa::path(
    patch,
    path = "/api/briefs/{id}",
    params(("id" = String, Path, description = "Brief id")),
    request_body = UpdateBriefRequest,
    responses(
        (status = 200, description = "Brief updated", body = BriefResponse),
        (status = 403, description = "Not the brief owner"),
        (status = 409, description = "brand_id changed or invalid status transition")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn update_brief(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBriefRequest>,
) -> Result<Json<BriefResponse>, AppError> {
    payload.validate()?;

    let brief = find_brief(&state.db, &id).await?;
    ensure_brief_manager(&state.db, &brief, &user).await?;
    ensure_same_brand(&brief.brand_id, payload.brand_id.as_deref())?;

    validate_terms(
        payload.is_paid.unwrap_or(brief.is_paid),
        payload.prize_amount.or(brief.prize_amount),
        payload.voting_start.or(brief.voting_start),
        payload.voting_end.or(brief.voting_end),
    )?;
    if let Some(status) = payload.status {
        check_transition(brief.status, status, user.role)?;
    }
    if let Some(files) = &payload.files {
        check_files(&state, files)?;
    }
    let tags = match &payload.tag_ids {
        Some(ids) => Some(resolve_tags(&state, ids).await?),
        None => None,
    };

    let mut active: briefs::ActiveModel = brief.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(is_paid) = payload.is_paid {
        active.is_paid = Set(is_paid);
    }
    if let Some(prize) = payload.prize_amount {
        active.prize_amount = Set(Some(prize));
    }
    if let Some(deadline) = payload.submission_deadline {
        active.submission_deadline = Set(Some(deadline));
    }
    if let Some(start) = payload.voting_start {
        active.voting_start = Set(Some(start));
    }
    if let Some(end) = payload.voting_end {
        active.voting_end = Set(Some(end));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(tags) = tags {
        active.tags = Set(tags);
    }
    if let Some(files) = payload.files {
        active.files = Set(FileList(files));
    }
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/briefs/{id}",
    params(("id" = String, Path, description = "Brief id")),
    responses(
        (status = 204, description = "Brief deleted with its submissions"),
        (status = 403, description = "Not the brief owner")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn delete_brief(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let brief = find_brief(&state.db, &id).await?;
    ensure_brief_manager(&state.db, &brief, &user).await?;

    Briefs::delete_by_id(brief.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/briefs/{id}/status",
    params(("id" = String, Path, description = "Brief id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed (or unchanged)", body = BriefResponse),
        (status = 409, description = "Invalid transition")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<BriefResponse>, AppError> {
    let brief = find_brief(&state.db, &id).await?;
    ensure_brief_manager(&state.db, &brief, &user).await?;

    if !check_transition(brief.status, payload.status, user.role)? {
        return Ok(Json(brief.into()));
    }

    let from = brief.status;
    let mut active: briefs::ActiveModel = brief.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!("🔀 Brief {} moved from {} to {}", updated.id, from, updated.status);
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/api/briefs/{id}/finalists",
    params(("id" = String, Path, description = "Brief id")),
    request_body = FinalistsRequest,
    responses(
        (status = 200, description = "Submissions marked as finalists", body = [SubmissionResponse]),
        (status = 409, description = "Brief is not in review")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn mark_finalists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<FinalistsRequest>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    if payload.submission_ids.is_empty() {
        return Err(AppError::Validation(
            "submission_ids must not be empty".to_string(),
        ));
    }
    let finalists = state
        .submissions
        .mark_finalists(&id, &payload.submission_ids, &user)
        .await?;
    Ok(Json(finalists.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/briefs/{id}/winner",
    params(("id" = String, Path, description = "Brief id")),
    request_body = WinnerRequest,
    responses(
        (status = 200, description = "Winner selected", body = WinnerResponse),
        (status = 409, description = "Brief is not in review")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn select_winner(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<WinnerRequest>,
) -> Result<Json<WinnerResponse>, AppError> {
    let (brief, submission) = state
        .submissions
        .select_winner(&id, &payload.submission_id, &user)
        .await?;
    Ok(Json(WinnerResponse {
        brief: brief.into(),
        submission: submission.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/briefs/{id}/submissions",
    params(("id" = String, Path, description = "Brief id"), SubmissionQuery),
    responses((status = 200, description = "Submissions to the brief", body = [SubmissionResponse])),
    tag = "briefs"
)]
pub async fn list_brief_submissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut query): Query<SubmissionQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    find_brief(&state.db, &id).await?;
    query.brief_id = Some(id);
    Ok(Json(query_submissions(&state, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/briefs/{id}/submissions",
    params(("id" = String, Path, description = "Brief id")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = SubmissionResponse),
        (status = 409, description = "Duplicate submission or brief not open")
    ),
    security(("jwt" = [])),
    tag = "briefs"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    payload.validate()?;
    let submission = state
        .submissions
        .create(&id, &user, payload.description, payload.files)
        .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}
