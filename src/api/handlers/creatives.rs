use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::check_files;
use crate::api::handlers::portfolios::find_portfolio;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::{FileList, StoredFile};
use crate::entities::{creatives, prelude::*};
use crate::services::ownership::not_owner;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct CreativeResponse {
    pub id: String,
    pub portfolio_id: String,
    pub title: String,
    pub description: Option<String>,
    pub files: Vec<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<creatives::Model> for CreativeResponse {
    fn from(c: creatives::Model) -> Self {
        Self {
            id: c.id,
            portfolio_id: c.portfolio_id,
            title: c.title,
            description: c.description,
            files: c.files.0,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreativeRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateCreativeRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub files: Option<Vec<StoredFile>>,
}

async fn find_creative(state: &AppState, id: &str) -> Result<creatives::Model, AppError> {
    Creatives::find_by_id(id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Creative not found".to_string()))
}

/// Mutations belong to the owner of the parent portfolio, or an admin.
async fn find_managed_creative(
    state: &AppState,
    id: &str,
    user: &AuthUser,
) -> Result<creatives::Model, AppError> {
    let creative = find_creative(state, id).await?;
    let portfolio = find_portfolio(state, &creative.portfolio_id).await?;
    if !user.can_manage(&portfolio.user_id) {
        return Err(not_owner("creative"));
    }
    Ok(creative)
}

#[utoipa::path(
    get,
    path = "/api/creatives/{id}",
    params(("id" = String, Path, description = "Creative id")),
    responses(
        (status = 200, description = "Creative", body = CreativeResponse),
        (status = 404, description = "Creative not found")
    ),
    tag = "creatives"
)]
pub async fn get_creative(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreativeResponse>, AppError> {
    Ok(Json(find_creative(&state, &id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/creatives/{id}",
    params(("id" = String, Path, description = "Creative id")),
    request_body = UpdateCreativeRequest,
    responses(
        (status = 200, description = "Creative updated", body = CreativeResponse),
        (status = 403, description = "Not the portfolio owner")
    ),
    security(("jwt" = [])),
    tag = "creatives"
)]
pub async fn update_creative(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCreativeRequest>,
) -> Result<Json<CreativeResponse>, AppError> {
    payload.validate()?;
    let creative = find_managed_creative(&state, &id, &user).await?;
    if let Some(files) = &payload.files {
        check_files(&state, files)?;
    }

    let mut active: creatives::ActiveModel = creative.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(files) = payload.files {
        active.files = Set(FileList(files));
    }
    active.updated_at = Set(Utc::now());
    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/creatives/{id}",
    params(("id" = String, Path, description = "Creative id")),
    responses(
        (status = 204, description = "Creative deleted"),
        (status = 403, description = "Not the portfolio owner")
    ),
    security(("jwt" = [])),
    tag = "creatives"
)]
pub async fn delete_creative(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let creative = find_managed_creative(&state, &id, &user).await?;
    Creatives::delete_by_id(creative.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
