use crate::api::error::AppError;
use crate::config::AuthConfig;
use crate::entities::types::{Role, StringList};
use crate::entities::{api_keys, prelude::*, refresh_tokens, users};
use crate::utils::auth::create_jwt;
use crate::utils::hash::{calculate_hash, generate_token};
use crate::utils::password::{hash_password, verify_password};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Prefix of every generated API key
pub const API_KEY_PREFIX: &str = "bh_";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub is_verified: bool,
}

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Self registration. `user` accounts are verified immediately, `admin`
    /// accounts wait for a super admin; `super_admin` cannot self-register.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
        role: Option<Role>,
    ) -> Result<(users::Model, Option<TokenPair>), AppError> {
        let role = role.unwrap_or(Role::User);
        if role == Role::SuperAdmin {
            return Err(AppError::forbidden(
                "super_admin accounts cannot be self-registered",
            ));
        }

        let user = self
            .create_account(NewAccount {
                username,
                email,
                password,
                role,
                is_verified: role == Role::User,
            })
            .await?;

        let tokens = if user.is_verified {
            Some(self.issue_tokens(&user).await?)
        } else {
            None
        };
        Ok((user, tokens))
    }

    /// Insert an account after the uniqueness pre-checks. The unique indexes
    /// still catch concurrent duplicates.
    pub async fn create_account(&self, account: NewAccount) -> Result<users::Model, AppError> {
        let taken = Users::find()
            .filter(users::Column::Username.eq(&account.username))
            .one(&self.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "CONFLICT",
                "Username already exists".to_string(),
            ));
        }

        let same_email_role = Users::find()
            .filter(users::Column::Email.eq(&account.email))
            .filter(users::Column::Role.eq(account.role))
            .one(&self.db)
            .await?;
        if same_email_role.is_some() {
            return Err(AppError::Conflict(
                "CONFLICT",
                format!("Email already registered as {}", account.role),
            ));
        }

        let password_hash = hash_password(&account.password)?;
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(account.username),
            email: Set(account.email),
            password_hash: Set(Some(password_hash)),
            role: Set(account.role),
            is_verified: Set(account.is_verified),
            is_active: Set(true),
            display_name: Set(None),
            bio: Set(None),
            avatar_url: Set(None),
            followed_tags: Set(StringList::default()),
            skills: Set(StringList::default()),
            specialities: Set(StringList::default()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("👤 Account {} created with role {}", user.username, user.role);
        Ok(user)
    }

    pub async fn login(
        &self,
        login: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<(users::Model, TokenPair), AppError> {
        let user = self.verify_credentials(login, password, role).await?;
        check_account_status(&user)?;
        let tokens = self.issue_tokens(&user).await?;
        Ok((user, tokens))
    }

    /// Match `login` against username or email. The same email may exist under
    /// several roles, so the first candidate whose password verifies wins.
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<users::Model, AppError> {
        let mut query = Users::find().filter(
            Condition::any()
                .add(users::Column::Username.eq(login))
                .add(users::Column::Email.eq(login)),
        );
        if let Some(role) = role {
            query = query.filter(users::Column::Role.eq(role));
        }
        let candidates = query
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await?;

        candidates
            .into_iter()
            .find(|u| {
                u.password_hash
                    .as_deref()
                    .is_some_and(|hash| verify_password(password, hash))
            })
            .ok_or_else(invalid_credentials)
    }

    pub async fn issue_tokens(&self, user: &users::Model) -> Result<TokenPair, AppError> {
        let ttl = Duration::minutes(self.config.access_token_ttl_minutes);
        let access_token = create_jwt(&user.id, user.role, &self.config.jwt_secret, ttl)?;

        let refresh_token = generate_token(32);
        let now = Utc::now();
        refresh_tokens::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user.id.clone()),
            token_hash: Set(calculate_hash(refresh_token.as_bytes())),
            expires_at: Set(now + Duration::days(self.config.refresh_token_ttl_days)),
            revoked: Set(false),
            created_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ttl.num_seconds(),
        })
    }

    /// Rotate a refresh token: the presented one is revoked and a new pair issued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let stored = RefreshTokens::find()
            .filter(refresh_tokens::Column::TokenHash.eq(calculate_hash(refresh_token.as_bytes())))
            .one(&self.db)
            .await?
            .ok_or_else(token_invalid)?;

        if stored.revoked || stored.expires_at < Utc::now() {
            warn!("Rejected stale refresh token for user {}", stored.user_id);
            return Err(token_invalid());
        }

        let user = self.load_user(&stored.user_id).await?;
        check_account_status(&user)?;

        let mut active: refresh_tokens::ActiveModel = stored.into();
        active.revoked = Set(true);
        active.update(&self.db).await?;

        self.issue_tokens(&user).await
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let stored = RefreshTokens::find()
            .filter(refresh_tokens::Column::TokenHash.eq(calculate_hash(refresh_token.as_bytes())))
            .one(&self.db)
            .await?;

        if let Some(stored) = stored {
            let mut active: refresh_tokens::ActiveModel = stored.into();
            active.revoked = Set(true);
            active.update(&self.db).await?;
        }
        Ok(())
    }

    pub async fn load_user(&self, user_id: &str) -> Result<users::Model, AppError> {
        Users::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("ACCOUNT_NOT_FOUND", "Account no longer exists".to_string())
            })
    }

    pub async fn authenticate_api_key(&self, key: &str) -> Result<users::Model, AppError> {
        let stored = ApiKeys::find()
            .filter(api_keys::Column::KeyHash.eq(calculate_hash(key.as_bytes())))
            .filter(api_keys::Column::RevokedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("TOKEN_INVALID", "Invalid API key".to_string()))?;

        let user_id = stored.user_id.clone();
        let mut active: api_keys::ActiveModel = stored.into();
        active.last_used_at = Set(Some(Utc::now()));
        active.update(&self.db).await?;

        self.load_user(&user_id).await
    }

    /// Returns the stored key and the plaintext, which is never persisted.
    pub async fn create_api_key(
        &self,
        user_id: &str,
        name: String,
    ) -> Result<(api_keys::Model, String), AppError> {
        let plaintext = format!("{}{}", API_KEY_PREFIX, generate_token(32));
        let key = api_keys::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            name: Set(name),
            key_prefix: Set(plaintext.chars().take(10).collect()),
            key_hash: Set(calculate_hash(plaintext.as_bytes())),
            created_at: Set(Utc::now()),
            last_used_at: Set(None),
            revoked_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        Ok((key, plaintext))
    }

    pub async fn list_api_keys(&self, user_id: &str) -> Result<Vec<api_keys::Model>, AppError> {
        Ok(ApiKeys::find()
            .filter(api_keys::Column::UserId.eq(user_id))
            .order_by_desc(api_keys::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn revoke_api_key(&self, user_id: &str, key_id: &str) -> Result<(), AppError> {
        let key = ApiKeys::find_by_id(key_id.to_string())
            .filter(api_keys::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("API key not found".to_string()))?;

        if key.revoked_at.is_none() {
            let mut active: api_keys::ActiveModel = key.into();
            active.revoked_at = Set(Some(Utc::now()));
            active.update(&self.db).await?;
        }
        Ok(())
    }
}

/// Disabled accounts never pass; unverified ones pass only as super_admin.
pub fn check_account_status(user: &users::Model) -> Result<(), AppError> {
    if !user.is_active {
        return Err(AppError::Forbidden(
            "ACCOUNT_DISABLED",
            "Account is disabled".to_string(),
        ));
    }
    if !user.is_verified && user.role != Role::SuperAdmin {
        return Err(AppError::Forbidden(
            "ACCOUNT_NOT_VERIFIED",
            "Account is awaiting verification".to_string(),
        ));
    }
    Ok(())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("INVALID_CREDENTIALS", "Invalid credentials".to_string())
}

fn token_invalid() -> AppError {
    AppError::Unauthorized("TOKEN_INVALID", "Invalid or expired token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, is_active: bool, is_verified: bool) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: "u1".to_string(),
            username: "u1".to_string(),
            email: "u1@example.com".to_string(),
            password_hash: None,
            role,
            is_verified,
            is_active,
            display_name: None,
            bio: None,
            avatar_url: None,
            followed_tags: StringList::default(),
            skills: StringList::default(),
            specialities: StringList::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_status() {
        assert!(check_account_status(&user(Role::User, true, true)).is_ok());

        let err = check_account_status(&user(Role::User, false, true)).unwrap_err();
        assert_eq!(err.status_and_code().1, "ACCOUNT_DISABLED");

        let err = check_account_status(&user(Role::Admin, true, false)).unwrap_err();
        assert_eq!(err.status_and_code().1, "ACCOUNT_NOT_VERIFIED");

        assert!(check_account_status(&user(Role::SuperAdmin, true, false)).is_ok());
    }
}
