use crate::AppState;
use crate::api::error::AppError;
use crate::entities::types::Role;
use crate::entities::users;
use crate::services::auth_service::check_account_status;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The authenticated principal, stored in request extensions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owners manage their own records, admins manage everyone's.
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

impl From<&users::Model> for AuthUser {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Resolve credentials from, in order, a Bearer JWT, Basic credentials and
/// the `X-API-Key` header. `Ok(None)` means no credentials were presented.
pub async fn resolve_principal(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthUser>, AppError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let api_key = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok());
    let auth_config = &state.config.auth;

    let user = if let Some(value) = authorization {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let claims = validate_jwt(token.trim(), &auth_config.jwt_secret).map_err(|e| {
                debug!("JWT rejected: {}", e);
                AppError::Unauthorized("TOKEN_INVALID", "Invalid or expired token".to_string())
            })?;
            state.auth.load_user(&claims.sub).await?
        } else if let Some(encoded) = value.strip_prefix("Basic ") {
            if !auth_config.allow_basic_auth {
                return Err(AppError::unauthorized("Basic authentication is disabled"));
            }
            let (login, password) = decode_basic(encoded.trim())?;
            state.auth.verify_credentials(&login, &password, None).await?
        } else {
            return Err(AppError::unauthorized("Unsupported authorization scheme"));
        }
    } else if let Some(key) = api_key {
        if !auth_config.allow_api_keys {
            return Err(AppError::unauthorized("API keys are disabled"));
        }
        state.auth.authenticate_api_key(key.trim()).await?
    } else {
        return Ok(None);
    };

    check_account_status(&user)?;
    Ok(Some(AuthUser::from(&user)))
}

fn decode_basic(encoded: &str) -> Result<(String, String), AppError> {
    let malformed = || AppError::unauthorized("Malformed Basic credentials");
    let bytes = STANDARD.decode(encoded).map_err(|_| malformed())?;
    let text = String::from_utf8(bytes).map_err(|_| malformed())?;
    let (login, password) = text.split_once(':').ok_or_else(malformed)?;
    Ok((login.to_string(), password.to_string()))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = resolve_principal(&state, req.headers()).await?;
    match principal {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => Err(AppError::unauthorized("Authentication required")),
    }
}

/// Public read routes: any credential failure continues the request anonymously.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let principal = resolve_principal(&state, req.headers()).await;
    match principal {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
        }
        Ok(None) => {}
        Err(e) => debug!("Continuing anonymously: {}", e),
    }
    next.run(req).await
}
