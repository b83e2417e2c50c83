use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::ReactionKind;
use crate::services::reaction_service::{ReactionCounts, ToggleOutcome};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleRequest {
    pub submission_id: String,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}/reactions",
    params(("id" = String, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Counters, plus the viewer's own state when authenticated", body = ReactionCounts),
        (status = 404, description = "Submission not found")
    ),
    tag = "reactions"
)]
pub async fn get_reactions(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<Json<ReactionCounts>, AppError> {
    let viewer_id = viewer.as_ref().map(|Extension(u)| u.id.as_str());
    Ok(Json(state.reactions.counts(&id, viewer_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/reactions",
    params(("id" = String, Path, description = "Submission id")),
    request_body = ReactionRequest,
    responses(
        (status = 201, description = "Reaction recorded", body = ReactionCounts),
        (status = 409, description = "Duplicate reaction or voting closed")
    ),
    security(("jwt" = [])),
    tag = "reactions"
)]
pub async fn add_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ReactionRequest>,
) -> Result<(StatusCode, Json<ReactionCounts>), AppError> {
    let counts = state.reactions.react(&id, &user.id, payload.kind).await?;
    Ok((StatusCode::CREATED, Json(counts)))
}

#[utoipa::path(
    delete,
    path = "/api/submissions/{id}/reactions/{type}",
    params(
        ("id" = String, Path, description = "Submission id"),
        ("type" = ReactionKind, Path, description = "like or vote")
    ),
    responses(
        (status = 200, description = "Reaction removed", body = ReactionCounts),
        (status = 404, description = "No such reaction")
    ),
    security(("jwt" = [])),
    tag = "reactions"
)]
pub async fn remove_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, kind)): Path<(String, ReactionKind)>,
) -> Result<Json<ReactionCounts>, AppError> {
    Ok(Json(state.reactions.remove(&id, &user.id, kind).await?))
}

#[utoipa::path(
    post,
    path = "/api/reactions/toggle",
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Reaction toggled", body = ToggleOutcome),
        (status = 409, description = "Voting closed")
    ),
    security(("jwt" = [])),
    tag = "reactions"
)]
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleOutcome>, AppError> {
    Ok(Json(
        state
            .reactions
            .toggle(&payload.submission_id, &user.id, payload.kind)
            .await?,
    ))
}
