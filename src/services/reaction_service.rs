//! Likes and votes on submissions.
//!
//! Reaction rows are the source of truth. After every change the `likes`
//! and `votes` columns of the submission are recomputed from those rows in
//! the same transaction.

use crate::api::error::AppError;
use crate::entities::types::ReactionKind;
use crate::entities::{prelude::*, reactions, submissions};
use crate::services::brief_workflow::ensure_voting_open;
use crate::services::submission_service::{find_brief, find_submission};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReactionCounts {
    pub submission_id: String,
    pub likes: i32,
    pub votes: i32,
    /// Whether the viewer liked the submission; absent for anonymous viewers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted: Option<bool>,
}

impl ReactionCounts {
    fn from_submission(submission: &submissions::Model) -> Self {
        Self {
            submission_id: submission.id.clone(),
            likes: submission.likes,
            votes: submission.votes,
            liked: None,
            voted: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleOutcome {
    /// State after the toggle
    pub active: bool,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
    pub counts: ReactionCounts,
}

pub struct ReactionService {
    db: DatabaseConnection,
}

impl ReactionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Strict create: a second identical reaction is a conflict.
    pub async fn react(
        &self,
        submission_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<ReactionCounts, AppError> {
        let txn = self.db.begin().await?;
        self.ensure_allowed(&txn, submission_id, kind).await?;

        if find_reaction(&txn, submission_id, user_id, kind).await?.is_some() {
            return Err(AppError::Conflict(
                "DUPLICATE_REACTION",
                format!("You already added a {} to this submission", kind),
            ));
        }
        insert_reaction(&txn, submission_id, user_id, kind).await?;

        let counts = recount(&txn, submission_id).await?;
        txn.commit().await?;
        Ok(counts)
    }

    pub async fn toggle(
        &self,
        submission_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<ToggleOutcome, AppError> {
        let txn = self.db.begin().await?;
        self.ensure_allowed(&txn, submission_id, kind).await?;

        let active = match find_reaction(&txn, submission_id, user_id, kind).await? {
            Some(existing) => {
                Reactions::delete_by_id(existing.id).exec(&txn).await?;
                false
            }
            None => {
                insert_reaction(&txn, submission_id, user_id, kind).await?;
                true
            }
        };

        let counts = recount(&txn, submission_id).await?;
        txn.commit().await?;
        Ok(ToggleOutcome {
            active,
            kind,
            counts,
        })
    }

    pub async fn remove(
        &self,
        submission_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<ReactionCounts, AppError> {
        let txn = self.db.begin().await?;
        find_submission(&txn, submission_id).await?;

        let existing = find_reaction(&txn, submission_id, user_id, kind)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No {} to remove", kind)))?;
        Reactions::delete_by_id(existing.id).exec(&txn).await?;

        let counts = recount(&txn, submission_id).await?;
        txn.commit().await?;
        Ok(counts)
    }

    /// Cached counters plus the viewer's own state when a viewer is known.
    pub async fn counts(
        &self,
        submission_id: &str,
        viewer: Option<&str>,
    ) -> Result<ReactionCounts, AppError> {
        let submission = find_submission(&self.db, submission_id).await?;
        let mut counts = ReactionCounts::from_submission(&submission);

        if let Some(user_id) = viewer {
            let mine = Reactions::find()
                .filter(reactions::Column::SubmissionId.eq(submission_id))
                .filter(reactions::Column::UserId.eq(user_id))
                .all(&self.db)
                .await?;
            counts.liked = Some(mine.iter().any(|r| r.kind == ReactionKind::Like));
            counts.voted = Some(mine.iter().any(|r| r.kind == ReactionKind::Vote));
        }
        Ok(counts)
    }

    async fn ensure_allowed(
        &self,
        txn: &DatabaseTransaction,
        submission_id: &str,
        kind: ReactionKind,
    ) -> Result<(), AppError> {
        let submission = find_submission(txn, submission_id).await?;
        if kind == ReactionKind::Vote {
            let brief = find_brief(txn, &submission.brief_id).await?;
            ensure_voting_open(&brief, Utc::now())?;
        }
        Ok(())
    }
}

async fn find_reaction<C: ConnectionTrait>(
    db: &C,
    submission_id: &str,
    user_id: &str,
    kind: ReactionKind,
) -> Result<Option<reactions::Model>, AppError> {
    Ok(Reactions::find()
        .filter(reactions::Column::SubmissionId.eq(submission_id))
        .filter(reactions::Column::UserId.eq(user_id))
        .filter(reactions::Column::Kind.eq(kind))
        .one(db)
        .await?)
}

async fn insert_reaction<C: ConnectionTrait>(
    db: &C,
    submission_id: &str,
    user_id: &str,
    kind: ReactionKind,
) -> Result<(), AppError> {
    reactions::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        submission_id: Set(submission_id.to_string()),
        user_id: Set(user_id.to_string()),
        kind: Set(kind),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(())
}

pub(crate) async fn recount<C: ConnectionTrait>(
    db: &C,
    submission_id: &str,
) -> Result<ReactionCounts, AppError> {
    let likes = count_kind(db, submission_id, ReactionKind::Like).await?;
    let votes = count_kind(db, submission_id, ReactionKind::Vote).await?;

    let submission = find_submission(db, submission_id).await?;
    let mut active: submissions::ActiveModel = submission.into();
    active.likes = Set(likes);
    active.votes = Set(votes);
    let submission = active.update(db).await?;

    Ok(ReactionCounts::from_submission(&submission))
}

async fn count_kind<C: ConnectionTrait>(
    db: &C,
    submission_id: &str,
    kind: ReactionKind,
) -> Result<i32, AppError> {
    let count = Reactions::find()
        .filter(reactions::Column::SubmissionId.eq(submission_id))
        .filter(reactions::Column::Kind.eq(kind))
        .count(db)
        .await?;
    Ok(count as i32)
}
