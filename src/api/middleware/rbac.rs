use crate::api::error::AppError;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::Role;
use crate::services::rbac::Rbac;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// State of a `resource:action` permission layer
#[derive(Clone)]
pub struct PermissionGuard {
    pub rbac: Arc<Rbac>,
    pub resource: &'static str,
    pub action: &'static str,
}

/// State of a role membership layer
#[derive(Clone)]
pub struct RoleGuard {
    pub allowed: &'static [Role],
}

pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];
pub const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];

fn principal(req: &Request) -> Result<&AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

/// Must run after `auth_middleware`.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = principal(&req)?;
    if !guard
        .rbac
        .has_permission(user.role.as_str(), guard.resource, guard.action)
    {
        debug!(
            "Denied {}:{} for {} ({})",
            guard.resource, guard.action, user.username, user.role
        );
        return Err(AppError::forbidden(format!(
            "Missing permission {}:{}",
            guard.resource, guard.action
        )));
    }
    Ok(next.run(req).await)
}

pub async fn require_roles(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = principal(&req)?;
    if !Rbac::has_role(user.role, guard.allowed) {
        return Err(AppError::forbidden("Insufficient role"));
    }
    Ok(next.run(req).await)
}
