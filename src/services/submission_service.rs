use crate::api::error::AppError;
use crate::api::middleware::auth::AuthUser;
use crate::entities::types::{BriefStatus, FileList, StoredFile};
use crate::entities::{briefs, prelude::*, reactions, submissions, users};
use crate::services::brief_workflow::{ensure_accepting_submissions, ensure_in_review};
use crate::services::ownership::{ensure_brief_manager, not_owner};
use crate::services::reaction_service::recount;
use crate::utils::validation::validate_stored_files;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

/// Submission lifecycle. Every multi-row write runs in one transaction.
pub struct SubmissionService {
    db: DatabaseConnection,
    max_file_size: usize,
}

/// Changes accepted from the author
#[derive(Debug, Default, Clone)]
pub struct SubmissionChanges {
    pub description: Option<String>,
    pub files: Option<Vec<StoredFile>>,
}

impl SubmissionService {
    pub fn new(db: DatabaseConnection, max_file_size: usize) -> Self {
        Self { db, max_file_size }
    }

    fn check_files(&self, files: &[StoredFile]) -> Result<(), AppError> {
        validate_stored_files(files, self.max_file_size)
            .map_err(|e| AppError::Validation(e.root_cause().to_string()))
    }

    pub async fn create(
        &self,
        brief_id: &str,
        user: &AuthUser,
        description: String,
        files: Vec<StoredFile>,
    ) -> Result<submissions::Model, AppError> {
        self.check_files(&files)?;

        let txn = self.db.begin().await?;

        let brief = find_brief(&txn, brief_id).await?;
        ensure_accepting_submissions(&brief, Utc::now())?;

        let existing = Submissions::find()
            .filter(submissions::Column::BriefId.eq(brief_id))
            .filter(submissions::Column::UserId.eq(&user.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "DUPLICATE_SUBMISSION",
                "You already submitted to this brief".to_string(),
            ));
        }

        let now = Utc::now();
        let submission = submissions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            brief_id: Set(brief_id.to_string()),
            user_id: Set(user.id.clone()),
            description: Set(description),
            files: Set(FileList(files)),
            is_finalist: Set(false),
            is_winner: Set(false),
            likes: Set(0),
            votes: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        sync_submission_count(&txn, brief).await?;
        txn.commit().await?;

        info!("📝 Submission {} created for brief {}", submission.id, brief_id);
        Ok(submission)
    }

    /// Author-only edit, allowed while the brief still accepts submissions.
    pub async fn update(
        &self,
        submission_id: &str,
        user: &AuthUser,
        changes: SubmissionChanges,
    ) -> Result<submissions::Model, AppError> {
        if let Some(files) = &changes.files {
            self.check_files(files)?;
        }

        let submission = find_submission(&self.db, submission_id).await?;
        if submission.user_id != user.id {
            return Err(not_owner("submission"));
        }
        let brief = find_brief(&self.db, &submission.brief_id).await?;
        ensure_accepting_submissions(&brief, Utc::now())?;

        let mut active: submissions::ActiveModel = submission.into();
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(files) = changes.files {
            active.files = Set(FileList(files));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Append already stored files to the author's submission.
    pub async fn append_files(
        &self,
        submission_id: &str,
        user: &AuthUser,
        files: Vec<StoredFile>,
    ) -> Result<submissions::Model, AppError> {
        let submission = find_submission(&self.db, submission_id).await?;
        let mut all = submission.files.0.clone();
        all.extend(files);
        self.update(
            submission_id,
            user,
            SubmissionChanges {
                description: None,
                files: Some(all),
            },
        )
        .await
    }

    /// Author or admin. The brief counter is recomputed in the same transaction.
    pub async fn delete(&self, submission_id: &str, user: &AuthUser) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        let submission = find_submission(&txn, submission_id).await?;
        if !user.can_manage(&submission.user_id) {
            return Err(not_owner("submission"));
        }
        let brief = find_brief(&txn, &submission.brief_id).await?;

        Submissions::delete_by_id(submission.id.clone())
            .exec(&txn)
            .await?;
        sync_submission_count(&txn, brief).await?;
        txn.commit().await?;

        info!("🗑️ Submission {} deleted by {}", submission_id, user.id);
        Ok(())
    }

    /// Delete an account together with its submissions and reactions, then
    /// recount every submission and brief counter those rows fed.
    pub async fn delete_account(&self, user: &users::Model) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        let reacted: Vec<String> = Reactions::find()
            .select_only()
            .column(reactions::Column::SubmissionId)
            .filter(reactions::Column::UserId.eq(&user.id))
            .distinct()
            .into_tuple()
            .all(&txn)
            .await?;
        let own: Vec<(String, String)> = Submissions::find()
            .select_only()
            .column(submissions::Column::Id)
            .column(submissions::Column::BriefId)
            .filter(submissions::Column::UserId.eq(&user.id))
            .into_tuple()
            .all(&txn)
            .await?;
        let own_ids: Vec<String> = own.iter().map(|(id, _)| id.clone()).collect();

        Reactions::delete_many()
            .filter(
                reactions::Column::UserId
                    .eq(&user.id)
                    .or(reactions::Column::SubmissionId.is_in(own_ids.clone())),
            )
            .exec(&txn)
            .await?;
        Submissions::delete_many()
            .filter(submissions::Column::Id.is_in(own_ids))
            .exec(&txn)
            .await?;
        Users::delete_by_id(user.id.clone()).exec(&txn).await?;

        // Brands owned by the account cascade away with their briefs
        let survivors = Submissions::find()
            .filter(submissions::Column::Id.is_in(reacted))
            .all(&txn)
            .await?;
        for submission in &survivors {
            recount(&txn, &submission.id).await?;
        }
        let briefs = Briefs::find()
            .filter(briefs::Column::Id.is_in(own.into_iter().map(|(_, brief_id)| brief_id)))
            .all(&txn)
            .await?;
        for brief in briefs {
            sync_submission_count(&txn, brief).await?;
        }

        txn.commit().await?;
        info!(
            "🗑️ Account {} deleted, {} submission counters refreshed",
            user.id,
            survivors.len()
        );
        Ok(())
    }

    pub async fn mark_finalists(
        &self,
        brief_id: &str,
        submission_ids: &[String],
        user: &AuthUser,
    ) -> Result<Vec<submissions::Model>, AppError> {
        let txn = self.db.begin().await?;

        let brief = find_brief(&txn, brief_id).await?;
        ensure_brief_manager(&txn, &brief, user).await?;
        ensure_in_review(&brief)?;

        let mut updated = Vec::with_capacity(submission_ids.len());
        for id in submission_ids {
            let submission = find_submission(&txn, id).await?;
            if submission.brief_id != brief.id {
                return Err(AppError::BadRequest(format!(
                    "Submission {} does not belong to this brief",
                    id
                )));
            }
            let mut active: submissions::ActiveModel = submission.into();
            active.is_finalist = Set(true);
            active.updated_at = Set(Utc::now());
            updated.push(active.update(&txn).await?);
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Crown one submission: clear any previous winner and close the brief.
    pub async fn select_winner(
        &self,
        brief_id: &str,
        submission_id: &str,
        user: &AuthUser,
    ) -> Result<(briefs::Model, submissions::Model), AppError> {
        let txn = self.db.begin().await?;

        let brief = find_brief(&txn, brief_id).await?;
        ensure_brief_manager(&txn, &brief, user).await?;
        ensure_in_review(&brief)?;

        let submission = find_submission(&txn, submission_id).await?;
        if submission.brief_id != brief.id {
            return Err(AppError::BadRequest(
                "Submission does not belong to this brief".to_string(),
            ));
        }

        let now = Utc::now();
        let previous = Submissions::find()
            .filter(submissions::Column::BriefId.eq(brief_id))
            .filter(submissions::Column::IsWinner.eq(true))
            .all(&txn)
            .await?;
        for prev in previous {
            let mut active: submissions::ActiveModel = prev.into();
            active.is_winner = Set(false);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let mut active: submissions::ActiveModel = submission.into();
        active.is_winner = Set(true);
        active.is_finalist = Set(true);
        active.updated_at = Set(now);
        let winner = active.update(&txn).await?;

        let mut brief_active: briefs::ActiveModel = brief.into();
        brief_active.status = Set(BriefStatus::Winner);
        brief_active.updated_at = Set(now);
        let brief = brief_active.update(&txn).await?;

        txn.commit().await?;

        info!("🏆 Submission {} won brief {}", winner.id, brief.id);
        Ok((brief, winner))
    }
}

pub async fn find_brief<C: ConnectionTrait>(db: &C, id: &str) -> Result<briefs::Model, AppError> {
    Briefs::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Brief not found".to_string()))
}

pub async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<submissions::Model, AppError> {
    Submissions::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
}

async fn sync_submission_count<C: ConnectionTrait>(
    db: &C,
    brief: briefs::Model,
) -> Result<(), AppError> {
    let count = Submissions::find()
        .filter(submissions::Column::BriefId.eq(&brief.id))
        .count(db)
        .await?;

    let mut active: briefs::ActiveModel = brief.into();
    active.submission_count = Set(count as i32);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(())
}
