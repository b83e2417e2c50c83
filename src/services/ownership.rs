use crate::api::error::AppError;
use crate::api::middleware::auth::AuthUser;
use crate::entities::{briefs, prelude::*};
use sea_orm::{ConnectionTrait, EntityTrait};

pub fn not_owner(what: &str) -> AppError {
    AppError::Forbidden("NOT_OWNER", format!("You do not own this {}", what))
}

/// Admins manage every brand; everyone else only their own.
pub fn ensure_brand_manager(owner_id: &str, user: &AuthUser) -> Result<(), AppError> {
    if user.can_manage(owner_id) {
        Ok(())
    } else {
        Err(not_owner("brand"))
    }
}

/// A brief is managed by admins, its creator, or the owner of its brand.
pub async fn ensure_brief_manager<C: ConnectionTrait>(
    db: &C,
    brief: &briefs::Model,
    user: &AuthUser,
) -> Result<(), AppError> {
    if user.can_manage(&brief.created_by) {
        return Ok(());
    }
    let brand = Brands::find_by_id(brief.brand_id.clone()).one(db).await?;
    match brand {
        Some(brand) if brand.owner_id == user.id => Ok(()),
        _ => Err(not_owner("brief")),
    }
}
