use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::briefs::{BriefQuery, BriefResponse, CreateBriefRequest, create_brief_in_brand, query_briefs};
use crate::api::handlers::page_bounds;
use crate::api::middleware::auth::AuthUser;
use crate::entities::{brands, prelude::*};
use crate::services::ownership::ensure_brand_manager;
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
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub struct BrandResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub contact_email: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<brands::Model> for BrandResponse {
    fn from(brand: brands::Model) -> Self {
        Self {
            id: brand.id,
            owner_id: brand.owner_id,
            name: brand.name,
            contact_email: brand.contact_email,
            description: brand.description,
            website: brand.website,
            logo_url: brand.logo_url,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub contact_email: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateBrandRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct BrandQuery {
    pub owner_id: Option<String>,
    /// Substring of the brand name
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn find_brand(state: &AppState, id: &str) -> Result<brands::Model, AppError> {
    Brands::find_by_id(id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_string()))
}

async fn ensure_contact_email_free(
    state: &AppState,
    email: &str,
    except: Option<&str>,
) -> Result<(), AppError> {
    let mut query = Brands::find().filter(brands::Column::ContactEmail.eq(email));
    if let Some(id) = except {
        query = query.filter(brands::Column::Id.ne(id));
    }
    if query.one(&state.db).await?.is_some() {
        return Err(AppError::Conflict(
            "CONFLICT",
            "A brand with this contact email already exists".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/brands",
    params(BrandQuery),
    responses((status = 200, description = "Brands", body = [BrandResponse])),
    tag = "brands"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<BrandResponse>>, AppError> {
    let mut select = Brands::find();
    if let Some(owner_id) = &query.owner_id {
        select = select.filter(brands::Column::OwnerId.eq(owner_id.as_str()));
    }
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(brands::Column::Name.contains(q));
    }

    let (offset, limit) = page_bounds(query.page, query.per_page);
    let brands = select
        .order_by_asc(brands::Column::Name)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;

    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand", body = BrandResponse),
        (status = 404, description = "Brand not found")
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BrandResponse>, AppError> {
    Ok(Json(find_brand(&state, &id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/brands",
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 409, description = "Contact email already used")
    ),
    security(("jwt" = [])),
    tag = "brands"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateBrandRequest>,
) -> Result<(StatusCode, Json<BrandResponse>), AppError> {
    payload.validate()?;
    ensure_contact_email_free(&state, &payload.contact_email, None).await?;

    let now = Utc::now();
    let brand = brands::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        owner_id: Set(user.id.clone()),
        name: Set(payload.name),
        contact_email: Set(payload.contact_email),
        description: Set(payload.description),
        website: Set(payload.website),
        logo_url: Set(payload.logo_url),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(brand.into())))
}

#[utoipa::path(
    patch,
    path = "/api/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = BrandResponse),
        (status = 403, description = "Not the brand owner")
    ),
    security(("jwt" = [])),
    tag = "brands"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBrandRequest>,
) -> Result<Json<BrandResponse>, AppError> {
    payload.validate()?;
    let brand = find_brand(&state, &id).await?;
    ensure_brand_manager(&brand.owner_id, &user)?;

    if let Some(email) = &payload.contact_email {
        ensure_contact_email_free(&state, email, Some(&brand.id)).await?;
    }

    let mut active: brands::ActiveModel = brand.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.contact_email {
        active.contact_email = Set(email);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(website) = payload.website {
        active.website = Set(Some(website));
    }
    if let Some(logo_url) = payload.logo_url {
        active.logo_url = Set(Some(logo_url));
    }
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    responses(
        (status = 204, description = "Brand deleted with its briefs"),
        (status = 403, description = "Not the brand owner")
    ),
    security(("jwt" = [])),
    tag = "brands"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let brand = find_brand(&state, &id).await?;
    ensure_brand_manager(&brand.owner_id, &user)?;

    Brands::delete_by_id(brand.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/brands/{id}/briefs",
    params(("id" = String, Path, description = "Brand id"), BriefQuery),
    responses((status = 200, description = "Briefs of the brand", body = [BriefResponse])),
    tag = "brands"
)]
pub async fn list_brand_briefs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut query): Query<BriefQuery>,
) -> Result<Json<Vec<BriefResponse>>, AppError> {
    find_brand(&state, &id).await?;
    query.brand_id = Some(id);
    Ok(Json(query_briefs(&state, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/brands/{id}/briefs",
    params(("id" = String, Path, description = "Brand id")),
    request_body = CreateBriefRequest,
    responses(
        (status = 201, description = "Brief created, `draft` unless a status is given", body = BriefResponse),
        (status = 403, description = "Not the brand owner"),
        (status = 409, description = "Body brand_id differs from the path")
    ),
    security(("jwt" = [])),
    tag = "brands"
)]
pub async fn create_brand_brief(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<CreateBriefRequest>,
) -> Result<(StatusCode, Json<BriefResponse>), AppError> {
    let brief = create_brief_in_brand(&state, &user, &id, payload).await?;
    Ok((StatusCode::CREATED, Json(brief)))
}
