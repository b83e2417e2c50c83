use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::page_bounds;
use crate::api::handlers::users::{UserResponse, find_user};
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::Role;
use crate::entities::{prelude::*, users};
use crate::services::auth_service::NewAccount;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Deserialize, IntoParams)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    /// Matches username or email
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct ModerateUserRequest {
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
}

/// Admins may moderate `user` and `admin` accounts, never a super admin.
fn ensure_can_moderate(actor: &AuthUser, target: &users::Model) -> Result<(), AppError> {
    if target.role == Role::SuperAdmin && actor.role != Role::SuperAdmin {
        return Err(AppError::forbidden("Super admin accounts cannot be moderated"));
    }
    Ok(())
}

/// Approving staff accounts is reserved for super admins.
fn ensure_can_verify(actor: &AuthUser, target: &users::Model) -> Result<(), AppError> {
    if target.role.is_admin() && actor.role != Role::SuperAdmin {
        return Err(AppError::forbidden(
            "Only a super admin can change verification of admin accounts",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQuery),
    responses((status = 200, description = "Accounts", body = [UserResponse])),
    security(("jwt" = [])),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let mut select = Users::find();
    if let Some(role) = query.role {
        select = select.filter(users::Column::Role.eq(role));
    }
    if let Some(is_active) = query.is_active {
        select = select.filter(users::Column::IsActive.eq(is_active));
    }
    if let Some(is_verified) = query.is_verified {
        select = select.filter(users::Column::IsVerified.eq(is_verified));
    }
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(users::Column::Username.contains(q))
                .add(users::Column::Email.contains(q)),
        );
    }

    let (offset, limit) = page_bounds(query.page, query.per_page);
    let accounts = select
        .order_by_desc(users::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Verified account created", body = UserResponse),
        (status = 409, description = "Username or email already taken")
    ),
    security(("jwt" = [])),
    tag = "admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let user = state
        .auth
        .create_account(NewAccount {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role: payload.role,
            is_verified: true,
        })
        .await?;

    info!(target: "audit", actor = %actor.id, user = %user.id, role = %user.role, "user_created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = ModerateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 403, description = "Target cannot be moderated"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "admin"
)]
pub async fn moderate_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ModerateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let target = find_user(&state, &id).await?;
    ensure_can_moderate(&actor, &target)?;
    if payload.is_verified.is_some() {
        ensure_can_verify(&actor, &target)?;
    }

    let mut active: users::ActiveModel = target.into();
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_verified) = payload.is_verified {
        active.is_verified = Set(is_verified);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(
        target: "audit",
        actor = %actor.id,
        user = %updated.id,
        is_active = updated.is_active,
        is_verified = updated.is_verified,
        "user_moderated"
    );
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/approve",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Account verified", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "admin"
)]
pub async fn approve_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let target = find_user(&state, &id).await?;

    let mut active: users::ActiveModel = target.into();
    active.is_verified = Set(true);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(target: "audit", actor = %actor.id, user = %updated.id, "user_approved");
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Target cannot be moderated")
    ),
    security(("jwt" = [])),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if id == actor.id {
        return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
    }
    let target = find_user(&state, &id).await?;
    ensure_can_moderate(&actor, &target)?;

    state.submissions.delete_account(&target).await?;

    info!(target: "audit", actor = %actor.id, user = %target.id, "user_deleted");
    Ok(StatusCode::NO_CONTENT)
}
