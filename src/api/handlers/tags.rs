use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::page_bounds;
use crate::api::middleware::auth::AuthUser;
use crate::entities::{prelude::*, tags};
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
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<tags::Model> for TagResponse {
    fn from(tag: tags::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            description: tag.description,
            created_at: tag.created_at,
        }
    }
}

const MAX_TAG_NAME: usize = 50;

#[derive(Deserialize, ToSchema, Validate)]
pub struct TagRequest {
    /// Trimmed and lowercased before it is checked and stored
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TagQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Canonical form of a tag name; blank or overlong names are rejected.
fn normalize_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::Validation("name: must not be blank".to_string()));
    }
    if name.chars().count() > MAX_TAG_NAME {
        return Err(AppError::Validation(format!(
            "name: at most {} characters",
            MAX_TAG_NAME
        )));
    }
    Ok(name)
}

async fn find_tag(state: &AppState, id: &str) -> Result<tags::Model, AppError> {
    Tags::find_by_id(id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))
}

async fn ensure_name_free(state: &AppState, name: &str) -> Result<(), AppError> {
    let taken = Tags::find()
        .filter(tags::Column::Name.eq(name))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "CONFLICT",
            format!("Tag '{}' already exists", name),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(TagQuery),
    responses((status = 200, description = "Tags", body = [TagResponse])),
    tag = "tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let mut select = Tags::find();
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(tags::Column::Name.contains(q));
    }
    let (offset, limit) = page_bounds(query.page, query.per_page);
    let rows = select
        .order_by_asc(tags::Column::Name)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TagResponse>, AppError> {
    Ok(Json(find_tag(&state, &id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 409, description = "Name already used")
    ),
    security(("jwt" = [])),
    tag = "tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    payload.validate()?;
    let name = normalize_name(&payload.name)?;
    ensure_name_free(&state, &name).await?;

    let tag = tags::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        description: Set(payload.description),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(target: "audit", actor = %actor.id, tag = %tag.id, name = %tag.name, "tag_created");
    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// Renames do not rewrite the snapshots already embedded in briefs.
#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag id")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 409, description = "Name already used")
    ),
    security(("jwt" = [])),
    tag = "tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    payload.validate()?;
    let tag = find_tag(&state, &id).await?;

    let name = payload.name.as_deref().map(normalize_name).transpose()?;
    if let Some(name) = &name
        && *name != tag.name
    {
        ensure_name_free(&state, name).await?;
    }

    let mut active: tags::ActiveModel = tag.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    let updated = active.update(&state.db).await?;

    info!(target: "audit", actor = %actor.id, tag = %updated.id, name = %updated.name, "tag_updated");
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    ),
    security(("jwt" = [])),
    tag = "tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let tag = find_tag(&state, &id).await?;
    Tags::delete_by_id(tag.id.clone()).exec(&state.db).await?;

    info!(target: "audit", actor = %actor.id, tag = %tag.id, name = %tag.name, "tag_deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Branding ").unwrap(), "branding");
        assert!(matches!(normalize_name("   "), Err(AppError::Validation(_))));
        assert!(matches!(normalize_name(""), Err(AppError::Validation(_))));
        assert!(normalize_name(&"x".repeat(MAX_TAG_NAME)).is_ok());
        assert!(normalize_name(&format!(" {} ", "x".repeat(MAX_TAG_NAME + 1))).is_err());
    }
}
