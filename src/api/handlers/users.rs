use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::{Role, StringList};
use crate::entities::{api_keys, prelude::*, users};
use crate::utils::password::hash_password;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Full account view for the account itself and for admins
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub followed_tags: Vec<String>,
    pub skills: Vec<String>,
    pub specialities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            is_active: user.is_active,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            followed_tags: user.followed_tags.0,
            skills: user.skills.0,
            specialities: user.specialities.0,
            created_at: user.created_at,
        }
    }
}

/// What anyone may see about an account
#[derive(Serialize, ToSchema)]
pub struct PublicProfile {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
    pub specialities: Vec<String>,
}

impl From<users::Model> for PublicProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            skills: user.skills.0,
            specialities: user.specialities.0,
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub skills: Option<Vec<String>>,
    pub specialities: Option<Vec<String>>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateApiKeyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<api_keys::Model> for ApiKeyResponse {
    fn from(key: api_keys::Model) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
            revoked_at: key.revoked_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreatedApiKeyResponse {
    #[serde(flatten)]
    pub key: ApiKeyResponse,
    /// Shown once, only the hash is stored
    pub api_key: String,
}

pub async fn find_user(state: &AppState, id: &str) -> Result<users::Model, AppError> {
    Users::find_by_id(id.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(find_user(&state, &user.id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already registered for this role")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let account = find_user(&state, &user.id).await?;

    if let Some(email) = &payload.email
        && *email != account.email
    {
        let taken = Users::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Role.eq(account.role))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "CONFLICT",
                format!("Email already registered as {}", account.role),
            ));
        }
    }

    let mut active: users::ActiveModel = account.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(display_name) = payload.display_name {
        active.display_name = Set(Some(display_name));
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(avatar_url) = payload.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    if let Some(skills) = payload.skills {
        active.skills = Set(StringList(skills));
    }
    if let Some(specialities) = payload.specialities {
        active.specialities = Set(StringList(specialities));
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(Some(hash_password(&password)?));
    }
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let account = find_user(&state, &id).await?;
    if !account.is_active {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(account.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/me/tags/{tag_id}",
    params(("tag_id" = String, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag followed", body = UserResponse),
        (status = 404, description = "Tag not found")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn follow_tag(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tag_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Tags::find_by_id(tag_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

    let account = find_user(&state, &user.id).await?;
    if account.followed_tags.contains(&tag_id) {
        return Ok(Json(account.into()));
    }

    let mut followed = account.followed_tags.clone();
    followed.0.push(tag_id);

    let mut active: users::ActiveModel = account.into();
    active.followed_tags = Set(followed);
    active.updated_at = Set(Utc::now());
    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/tags/{tag_id}",
    params(("tag_id" = String, Path, description = "Tag id")),
    responses((status = 200, description = "Tag unfollowed", body = UserResponse)),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn unfollow_tag(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tag_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let account = find_user(&state, &user.id).await?;
    if !account.followed_tags.contains(&tag_id) {
        return Ok(Json(account.into()));
    }

    let followed = StringList(
        account
            .followed_tags
            .0
            .iter()
            .filter(|t| **t != tag_id)
            .cloned()
            .collect(),
    );

    let mut active: users::ActiveModel = account.into();
    active.followed_tags = Set(followed);
    active.updated_at = Set(Utc::now());
    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/users/me/api-keys",
    responses((status = 200, description = "API keys of the current user", body = [ApiKeyResponse])),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = state.auth.list_api_keys(&user.id).await?;
    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/users/me/api-keys",
    request_body = CreateApiKeyRequest,
    responses((status = 201, description = "API key created", body = CreatedApiKeyResponse)),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreatedApiKeyResponse>), AppError> {
    payload.validate()?;
    let (key, plaintext) = state.auth.create_api_key(&user.id, payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyResponse {
            key: key.into(),
            api_key: plaintext,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/api-keys/{id}",
    params(("id" = String, Path, description = "API key id")),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 404, description = "API key not found")
    ),
    security(("jwt" = [])),
    tag = "users"
)]
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.auth.revoke_api_key(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
