use crate::config::AuthConfig;
use crate::entities::types::Role;
use crate::entities::{prelude::*, tags, users};
use crate::services::auth_service::{AuthService, NewAccount};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

/// Create the configured super admin when no super admin exists yet.
pub async fn bootstrap_super_admin(
    db: &DatabaseConnection,
    config: &AuthConfig,
) -> anyhow::Result<()> {
    let Some(account) = &config.bootstrap_super_admin else {
        return Ok(());
    };

    let existing = Users::find()
        .filter(users::Column::Role.eq(Role::SuperAdmin))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    info!("🌱 Bootstrapping super admin {}", account.username);
    AuthService::new(db.clone(), config.clone())
        .create_account(NewAccount {
            username: account.username.clone(),
            email: account.email.clone(),
            password: account.password.clone(),
            role: Role::SuperAdmin,
            is_verified: true,
        })
        .await
        .map_err(|e| anyhow::anyhow!("failed to bootstrap super admin: {}", e))?;
    Ok(())
}

/// Starter tags so a fresh install has something to file briefs under.
pub async fn seed_tags(db: &DatabaseConnection) -> anyhow::Result<()> {
    let defaults = [
        ("branding", "Logos, identities and brand systems"),
        ("illustration", "Drawn and painted artwork"),
        ("video", "Motion, edits and animation"),
        ("photography", "Shoots and retouching"),
        ("copywriting", "Slogans, scripts and long form copy"),
        ("music", "Jingles, scores and sound design"),
    ];

    for (name, description) in defaults {
        let exists = Tags::find()
            .filter(tags::Column::Name.eq(name))
            .one(db)
            .await?;

        if exists.is_none() {
            tags::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                created_at: Set(Utc::now()),
            }
            .insert(db)
            .await?;
        }
    }

    info!("✅ Seeding completed.");
    Ok(())
}
