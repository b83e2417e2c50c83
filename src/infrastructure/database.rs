use crate::config::DatabaseConfig;
use crate::entities::{
    api_keys, brands, briefs, creatives, portfolios, reactions, refresh_tokens, submissions, tags,
    users,
};
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", redact_url(&config.url));

    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Create missing tables and indexes from the entity definitions.
/// Tables are created parents first so foreign keys resolve on PostgreSQL.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🔄 Running SeaORM schema sync...");
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = vec![
        schema
            .create_table_from_entity(users::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(tags::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(brands::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(briefs::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(submissions::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(reactions::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(portfolios::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(creatives::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(refresh_tokens::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(api_keys::Entity)
            .if_not_exists()
            .to_owned(),
    ];

    for stmt in tables {
        db.execute(builder.build(&stmt)).await?;
    }

    for stmt in unique_indexes() {
        db.execute(builder.build(&stmt)).await?;
    }

    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        // Email is unique per role, not globally
        Index::create()
            .name("idx_users_email_role")
            .table(users::Entity)
            .col(users::Column::Email)
            .col(users::Column::Role)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_submissions_brief_user")
            .table(submissions::Entity)
            .col(submissions::Column::BriefId)
            .col(submissions::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_reactions_submission_user_kind")
            .table(reactions::Entity)
            .col(reactions::Column::SubmissionId)
            .col(reactions::Column::UserId)
            .col(reactions::Column::Kind)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
