pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::api::handlers::{
    admin, auth, brands, briefs, creatives, health, portfolios, reactions, submissions, tags,
    uploads, users,
};
use crate::api::middleware::auth::{auth_middleware, optional_auth_middleware};
use crate::api::middleware::rbac::{
    ADMIN_ROLES, PermissionGuard, RoleGuard, SUPER_ADMIN_ONLY, require_permission, require_roles,
};
use crate::api::middleware::{request_id::request_id_middleware, security::security_headers};
use crate::config::AppConfig;
use crate::entities::types::Role;
use crate::services::auth_service::AuthService;
use crate::services::rbac::Rbac;
use crate::services::reaction_service::ReactionService;
use crate::services::storage::StorageService;
use crate::services::submission_service::SubmissionService;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{MethodRouter, delete, get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::refresh,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::users::get_profile,
        api::handlers::users::update_profile,
        api::handlers::users::get_user,
        api::handlers::users::follow_tag,
        api::handlers::users::unfollow_tag,
        api::handlers::users::list_api_keys,
        api::handlers::users::create_api_key,
        api::handlers::users::revoke_api_key,
        api::handlers::admin::list_users,
        api::handlers::admin::create_user,
        api::handlers::admin::moderate_user,
        api::handlers::admin::approve_user,
        api::handlers::admin::delete_user,
        api::handlers::brands::list_brands,
        api::handlers::brands::get_brand,
        api::handlers::brands::create_brand,
        api::handlers::brands::update_brand,
        api::handlers::brands::delete_brand,
        api::handlers::brands::list_brand_briefs,
        api::handlers::brands::create_brand_brief,
        api::handlers::briefs::list_briefs,
        api::handlers::briefs::get_brief,
        api::handlers::briefs::create_brief,
        api::handlers::briefs::update_brief,
        api::handlers::briefs::delete_brief,
        api::handlers::briefs::change_status,
        api::handlers::briefs::mark_finalists,
        api::handlers::briefs::select_winner,
        api::handlers::briefs::list_brief_submissions,
        api::handlers::briefs::create_submission,
        api::handlers::submissions::list_submissions,
        api::handlers::submissions::get_submission,
        api::handlers::submissions::update_submission,
        api::handlers::submissions::delete_submission,
        api::handlers::submissions::upload_submission_files,
        api::handlers::reactions::get_reactions,
        api::handlers::reactions::add_reaction,
        api::handlers::reactions::remove_reaction,
        api::handlers::reactions::toggle_reaction,
        api::handlers::tags::list_tags,
        api::handlers::tags::get_tag,
        api::handlers::tags::create_tag,
        api::handlers::tags::update_tag,
        api::handlers::tags::delete_tag,
        api::handlers::portfolios::list_portfolios,
        api::handlers::portfolios::get_portfolio,
        api::handlers::portfolios::create_portfolio,
        api::handlers::portfolios::update_portfolio,
        api::handlers::portfolios::delete_portfolio,
        api::handlers::portfolios::like_portfolio,
        api::handlers::portfolios::list_creatives,
        api::handlers::portfolios::create_creative,
        api::handlers::creatives::get_creative,
        api::handlers::creatives::update_creative,
        api::handlers::creatives::delete_creative,
        api::handlers::uploads::upload_files,
        api::handlers::uploads::upload_base64,
    ),
    components(
        schemas(
            entities::types::Role,
            entities::types::BriefStatus,
            entities::types::ReactionKind,
            entities::types::StoredFile,
            entities::types::TagSnapshot,
            api::middleware::auth::AuthUser,
            services::auth_service::TokenPair,
            services::reaction_service::ReactionCounts,
            services::reaction_service::ToggleOutcome,
            api::handlers::health::HealthResponse,
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::RegisterResponse,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::auth::RefreshRequest,
            api::handlers::users::UserResponse,
            api::handlers::users::PublicProfile,
            api::handlers::users::UpdateProfileRequest,
            api::handlers::users::CreateApiKeyRequest,
            api::handlers::users::ApiKeyResponse,
            api::handlers::users::CreatedApiKeyResponse,
            api::handlers::admin::ModerateUserRequest,
            api::handlers::admin::CreateUserRequest,
            api::handlers::brands::BrandResponse,
            api::handlers::brands::CreateBrandRequest,
            api::handlers::brands::UpdateBrandRequest,
            api::handlers::briefs::BriefResponse,
            api::handlers::briefs::CreateBriefRequest,
            api::handlers::briefs::UpdateBriefRequest,
            api::handlers::briefs::StatusRequest,
            api::handlers::briefs::FinalistsRequest,
            api::handlers::briefs::WinnerRequest,
            api::handlers::briefs::WinnerResponse,
            api::handlers::submissions::SubmissionResponse,
            api::handlers::submissions::CreateSubmissionRequest,
            api::handlers::submissions::UpdateSubmissionRequest,
            api::handlers::reactions::ReactionRequest,
            api::handlers::reactions::ToggleRequest,
            api::handlers::tags::TagResponse,
            api::handlers::tags::TagRequest,
            api::handlers::tags::UpdateTagRequest,
            api::handlers::portfolios::PortfolioResponse,
            api::handlers::portfolios::CreatePortfolioRequest,
            api::handlers::portfolios::UpdatePortfolioRequest,
            api::handlers::creatives::CreativeResponse,
            api::handlers::creatives::CreativeRequest,
            api::handlers::creatives::UpdateCreativeRequest,
            api::handlers::uploads::Base64UploadRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login and tokens"),
        (name = "users", description = "Profiles, followed tags and API keys"),
        (name = "admin", description = "Account moderation"),
        (name = "brands", description = "Brand management"),
        (name = "briefs", description = "Briefs and their workflow"),
        (name = "submissions", description = "Submissions to briefs"),
        (name = "reactions", description = "Likes and votes on submissions"),
        (name = "tags", description = "Tag catalogue"),
        (name = "portfolios", description = "Creator portfolios"),
        (name = "creatives", description = "Portfolio items"),
        (name = "uploads", description = "File uploads")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub rbac: Arc<Rbac>,
    pub auth: Arc<AuthService>,
    pub submissions: Arc<SubmissionService>,
    pub reactions: Arc<ReactionService>,
    pub uploads: Arc<UploadService>,
}

impl AppState {
    /// Wire the services that share the connection, the storage backend and the config.
    pub fn new(
        db: DatabaseConnection,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageService>,
    ) -> Self {
        Self {
            rbac: Arc::new(Rbac::new(config.auth.rbac.clone())),
            auth: Arc::new(AuthService::new(db.clone(), config.auth.clone())),
            submissions: Arc::new(SubmissionService::new(
                db.clone(),
                config.storage.max_file_size,
            )),
            reactions: Arc::new(ReactionService::new(db.clone())),
            uploads: Arc::new(UploadService::new(storage, config.storage.clone())),
            db,
            config,
        }
    }
}

fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// Authentication, then a `resource:action` check against the configured policy.
fn permitted(
    state: &AppState,
    resource: &'static str,
    action: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let guard = PermissionGuard {
        rbac: state.rbac.clone(),
        resource,
        action,
    };
    authenticated(state, route.route_layer(from_fn_with_state(guard, require_permission)))
}

fn restricted(
    state: &AppState,
    allowed: &'static [Role],
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    authenticated(
        state,
        route.route_layer(from_fn_with_state(RoleGuard { allowed }, require_roles)),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    if origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn create_app(state: AppState) -> Router {
    let s = &state;
    let storage = &state.config.storage;
    // Multipart overhead on top of the file payloads
    let multipart_limit = storage
        .max_file_size
        .saturating_mul(storage.max_files)
        .saturating_add(10 * 1024 * 1024);
    // Base64 inflates payloads by a third
    let base64_limit = storage.max_file_size / 3 * 4 + 1024 * 1024;

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", authenticated(s, get(auth::me)));

    let user_routes = Router::new()
        .route(
            "/me",
            authenticated(s, get(users::get_profile).patch(users::update_profile)),
        )
        .route(
            "/me/tags/:tag_id",
            authenticated(s, put(users::follow_tag).delete(users::unfollow_tag)),
        )
        .route(
            "/me/api-keys",
            authenticated(s, get(users::list_api_keys).post(users::create_api_key)),
        )
        .route(
            "/me/api-keys/:id",
            authenticated(s, delete(users::revoke_api_key)),
        )
        .route("/:id", get(users::get_user));

    let admin_routes = Router::new()
        .route(
            "/users",
            restricted(s, ADMIN_ROLES, get(admin::list_users))
                .merge(restricted(s, SUPER_ADMIN_ONLY, post(admin::create_user))),
        )
        .route(
            "/users/:id",
            restricted(
                s,
                ADMIN_ROLES,
                patch(admin::moderate_user).delete(admin::delete_user),
            ),
        )
        .route(
            "/users/:id/approve",
            restricted(s, SUPER_ADMIN_ONLY, post(admin::approve_user)),
        );

    let brand_routes = Router::new()
        .route(
            "/",
            get(brands::list_brands).merge(permitted(
                s,
                "brands",
                "create",
                post(brands::create_brand),
            )),
        )
        .route(
            "/:id",
            get(brands::get_brand)
                .merge(permitted(s, "brands", "update", patch(brands::update_brand)))
                .merge(permitted(s, "brands", "delete", delete(brands::delete_brand))),
        )
        .route(
            "/:id/briefs",
            get(brands::list_brand_briefs).merge(permitted(
                s,
                "briefs",
                "create",
                post(brands::create_brand_brief),
            )),
        );

    let brief_routes = Router::new()
        .route(
            "/",
            get(briefs::list_briefs).merge(permitted(
                s,
                "briefs",
                "create",
                post(briefs::create_brief),
            )),
        )
        .route(
            "/:id",
            get(briefs::get_brief)
                .merge(permitted(s, "briefs", "update", patch(briefs::update_brief)))
                .merge(permitted(s, "briefs", "delete", delete(briefs::delete_brief))),
        )
        .route(
            "/:id/status",
            permitted(s, "briefs", "update", post(briefs::change_status)),
        )
        .route(
            "/:id/finalists",
            permitted(s, "briefs", "update", post(briefs::mark_finalists)),
        )
        .route(
            "/:id/winner",
            permitted(s, "briefs", "update", post(briefs::select_winner)),
        )
        .route(
            "/:id/submissions",
            get(briefs::list_brief_submissions).merge(permitted(
                s,
                "submissions",
                "create",
                post(briefs::create_submission),
            )),
        );

    let submission_routes = Router::new()
        .route("/", get(submissions::list_submissions))
        .route(
            "/:id",
            get(submissions::get_submission)
                .merge(permitted(
                    s,
                    "submissions",
                    "update",
                    patch(submissions::update_submission),
                ))
                .merge(permitted(
                    s,
                    "submissions",
                    "delete",
                    delete(submissions::delete_submission),
                )),
        )
        .route(
            "/:id/files",
            permitted(
                s,
                "submissions",
                "update",
                post(submissions::upload_submission_files)
                    .layer(DefaultBodyLimit::max(multipart_limit)),
            ),
        )
        .route(
            "/:id/reactions",
            get(reactions::get_reactions)
                .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
                .merge(permitted(
                    s,
                    "reactions",
                    "create",
                    post(reactions::add_reaction),
                )),
        )
        .route(
            "/:id/reactions/:type",
            permitted(s, "reactions", "delete", delete(reactions::remove_reaction)),
        );

    let tag_routes = Router::new()
        .route(
            "/",
            get(tags::list_tags).merge(permitted(s, "tags", "create", post(tags::create_tag))),
        )
        .route(
            "/:id",
            get(tags::get_tag)
                .merge(permitted(s, "tags", "update", patch(tags::update_tag)))
                .merge(permitted(s, "tags", "delete", delete(tags::delete_tag))),
        );

    let portfolio_routes = Router::new()
        .route(
            "/",
            get(portfolios::list_portfolios).merge(permitted(
                s,
                "portfolios",
                "create",
                post(portfolios::create_portfolio),
            )),
        )
        .route(
            "/:id",
            get(portfolios::get_portfolio).merge(authenticated(
                s,
                patch(portfolios::update_portfolio).delete(portfolios::delete_portfolio),
            )),
        )
        .route(
            "/:id/like",
            authenticated(s, post(portfolios::like_portfolio)),
        )
        .route(
            "/:id/creatives",
            get(portfolios::list_creatives)
                .merge(authenticated(s, post(portfolios::create_creative))),
        );

    let creative_routes = Router::new().route(
        "/:id",
        get(creatives::get_creative).merge(authenticated(
            s,
            patch(creatives::update_creative).delete(creatives::delete_creative),
        )),
    );

    let upload_routes = Router::new()
        .route(
            "/",
            permitted(
                s,
                "uploads",
                "create",
                post(uploads::upload_files).layer(DefaultBodyLimit::max(multipart_limit)),
            ),
        )
        .route(
            "/base64",
            permitted(
                s,
                "uploads",
                "create",
                post(uploads::upload_base64).layer(DefaultBodyLimit::max(base64_limit)),
            ),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/admin", admin_routes)
        .nest("/brands", brand_routes)
        .nest("/briefs", brief_routes)
        .nest("/submissions", submission_routes)
        .route(
            "/reactions/toggle",
            permitted(s, "reactions", "create", post(reactions::toggle_reaction)),
        )
        .nest("/tags", tag_routes)
        .nest("/portfolios", portfolio_routes)
        .nest("/creatives", creative_routes)
        .nest("/uploads", upload_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .layer(from_fn(security_headers))
        .layer(cors_layer(&state.config.server.allowed_origins))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
