use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::creatives::{CreativeRequest, CreativeResponse};
use crate::api::handlers::{check_files, page_bounds};
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::{FileList, StoredFile};
use crate::entities::{creatives, portfolios, prelude::*};
use crate::services::ownership::not_owner;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct PortfolioResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub like_count: i32,
    pub files: Vec<StoredFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<portfolios::Model> for PortfolioResponse {
    fn from(p: portfolios::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            description: p.description,
            like_count: p.like_count,
            files: p.files.0,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreatePortfolioRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdatePortfolioRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub files: Option<Vec<StoredFile>>,
}

#[derive(Deserialize, IntoParams)]
pub struct PortfolioQuery {
    pub user_id: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn find_portfolio(state: &AppState, id: &str) -> Result<portfolios::Model, AppError> {
    Portfolios::find_by_id(id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/portfolios",
    params(PortfolioQuery),
    responses((status = 200, description = "Portfolios", body = [PortfolioResponse])),
    tag = "portfolios"
)]
pub async fn list_portfolios(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Vec<PortfolioResponse>>, AppError> {
    let mut select = Portfolios::find();
    if let Some(user_id) = &query.user_id {
        select = select.filter(portfolios::Column::UserId.eq(user_id.as_str()));
    }
    let (offset, limit) = page_bounds(query.page, query.per_page);
    let rows = select
        .order_by_desc(portfolios::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/portfolios/{id}",
    params(("id" = String, Path, description = "Portfolio id")),
    responses(
        (status = 200, description = "Portfolio", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    ),
    tag = "portfolios"
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PortfolioResponse>, AppError> {
    Ok(Json(find_portfolio(&state, &id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/portfolios",
    request_body = CreatePortfolioRequest,
    responses((status = 201, description = "Portfolio created", body = PortfolioResponse)),
    security(("jwt" = [])),
    tag = "portfolios"
)]
pub async fn create_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreatePortfolioRequest>,
) -> Result<(StatusCode, Json<PortfolioResponse>), AppError> {
    payload.validate()?;
    check_files(&state, &payload.files)?;

    let now = Utc::now();
    let portfolio = portfolios::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user.id.clone()),
        title: Set(payload.title),
        description: Set(payload.description),
        like_count: Set(0),
        files: Set(FileList(payload.files)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(portfolio.into())))
}

#[utoipa::path(
    patch,
    path = "/api/portfolios/{id}",
    params(("id" = String, Path, description = "Portfolio id")),
    request_body = UpdatePortfolioRequest,
    responses(
        (status = 200, description = "Portfolio updated", body = PortfolioResponse),
        (status = 403, description = "Not the owner")
    ),
    security(("jwt" = [])),
    tag = "portfolios"
)]
pub async fn update_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> Result<Json<PortfolioResponse>, AppError> {
    payload.validate()?;
    let portfolio = find_portfolio(&state, &id).await?;
    if !user.can_manage(&portfolio.user_id) {
        return Err(not_owner("portfolio"));
    }
    if let Some(files) = &payload.files {
        check_files(&state, files)?;
    }

    let mut active: portfolios::ActiveModel = portfolio.into();
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
    path = "/api/portfolios/{id}",
    params(("id" = String, Path, description = "Portfolio id")),
    responses(
        (status = 204, description = "Portfolio deleted with its creatives"),
        (status = 403, description = "Not the owner")
    ),
    security(("jwt" = [])),
    tag = "portfolios"
)]
pub async fn delete_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let portfolio = find_portfolio(&state, &id).await?;
    if !user.can_manage(&portfolio.user_id) {
        return Err(not_owner("portfolio"));
    }
    Portfolios::delete_by_id(portfolio.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Plain counter, no per-user record.
#[utoipa::path(
    post,
    path = "/api/portfolios/{id}/like",
    params(("id" = String, Path, description = "Portfolio id")),
    responses(
        (status = 200, description = "Like counted", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    ),
    security(("jwt" = [])),
    tag = "portfolios"
)]
pub async fn like_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PortfolioResponse>, AppError> {
    let result = Portfolios::update_many()
        .col_expr(
            portfolios::Column::LikeCount,
            Expr::col(portfolios::Column::LikeCount).add(1),
        )
        .filter(portfolios::Column::Id.eq(id.as_str()))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Portfolio not found".to_string()));
    }
    Ok(Json(find_portfolio(&state, &id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/portfolios/{id}/creatives",
    params(("id" = String, Path, description = "Portfolio id")),
    responses((status = 200, description = "Creatives of the portfolio", body = [CreativeResponse])),
    tag = "portfolios"
)]
pub async fn list_creatives(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CreativeResponse>>, AppError> {
    find_portfolio(&state, &id).await?;
    let rows = Creatives::find()
        .filter(creatives::Column::PortfolioId.eq(id.as_str()))
        .order_by_asc(creatives::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/portfolios/{id}/creatives",
    params(("id" = String, Path, description = "Portfolio id")),
    request_body = CreativeRequest,
    responses(
        (status = 201, description = "Creative added", body = CreativeResponse),
        (status = 403, description = "Not the portfolio owner")
    ),
    security(("jwt" = [])),
    tag = "portfolios"
)]
pub async fn create_creative(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreativeRequest>,
) -> Result<(StatusCode, Json<CreativeResponse>), AppError> {
    payload.validate()?;
    let portfolio = find_portfolio(&state, &id).await?;
    if !user.can_manage(&portfolio.user_id) {
        return Err(not_owner("portfolio"));
    }
    check_files(&state, &payload.files)?;

    let now = Utc::now();
    let creative = creatives::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        portfolio_id: Set(portfolio.id),
        title: Set(payload.title),
        description: Set(payload.description),
        files: Set(FileList(payload.files)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(creative.into())))
}
