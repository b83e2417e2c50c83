//! Brief lifecycle rules: `draft -> submission -> in_review -> winner`.
//!
//! These are pure checks over a loaded brief; callers map the returned
//! `AppError`s straight into responses.

use crate::api::error::AppError;
use crate::entities::briefs;
use crate::entities::types::{BriefStatus, Role};
use chrono::{DateTime, Utc};

/// Validate a status change. Returns `false` when nothing needs to change.
pub fn check_transition(
    from: BriefStatus,
    to: BriefStatus,
    actor: Role,
) -> Result<bool, AppError> {
    use BriefStatus::*;

    if from == to {
        return Ok(false);
    }

    let allowed = matches!(
        (from, to),
        (Draft, Submission) | (Submission, InReview) | (InReview, Submission) | (InReview, Winner)
    ) || (to == Draft && actor.is_admin());

    if allowed {
        Ok(true)
    } else {
        Err(AppError::Conflict(
            "INVALID_TRANSITION",
            format!("Cannot move brief from {} to {}", from, to),
        ))
    }
}

/// A brief accepts new or edited submissions only while in `submission`
/// and before its deadline.
pub fn ensure_accepting_submissions(
    brief: &briefs::Model,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if brief.status != BriefStatus::Submission {
        return Err(AppError::Conflict(
            "BRIEF_NOT_OPEN",
            format!("Brief is {}, not accepting submissions", brief.status),
        ));
    }
    if let Some(deadline) = brief.submission_deadline
        && now > deadline
    {
        return Err(AppError::Conflict(
            "BRIEF_NOT_OPEN",
            "Submission deadline has passed".to_string(),
        ));
    }
    Ok(())
}

/// Votes count only during review, inside the voting window when one is set.
pub fn ensure_voting_open(brief: &briefs::Model, now: DateTime<Utc>) -> Result<(), AppError> {
    if brief.status != BriefStatus::InReview {
        return Err(AppError::Conflict(
            "BRIEF_NOT_OPEN",
            format!("Brief is {}, voting is closed", brief.status),
        ));
    }
    let before_start = brief.voting_start.is_some_and(|start| now < start);
    let after_end = brief.voting_end.is_some_and(|end| now > end);
    if before_start || after_end {
        return Err(AppError::Conflict(
            "BRIEF_NOT_OPEN",
            "Outside of the voting window".to_string(),
        ));
    }
    Ok(())
}

/// Finalist and winner selection happen during review only.
pub fn ensure_in_review(brief: &briefs::Model) -> Result<(), AppError> {
    if brief.status != BriefStatus::InReview {
        return Err(AppError::Conflict(
            "INVALID_TRANSITION",
            format!("Brief is {}, expected in_review", brief.status),
        ));
    }
    Ok(())
}

/// Field level rules shared by brief create and update.
pub fn validate_terms(
    is_paid: bool,
    prize_amount: Option<f64>,
    voting_start: Option<DateTime<Utc>>,
    voting_end: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    if is_paid && !prize_amount.is_some_and(|p| p > 0.0) {
        return Err(AppError::Validation(
            "Paid briefs require a positive prize_amount".to_string(),
        ));
    }
    if prize_amount.is_some_and(|p| p < 0.0) {
        return Err(AppError::Validation(
            "prize_amount must not be negative".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (voting_start, voting_end)
        && start > end
    {
        return Err(AppError::Validation(
            "voting_start must not be after voting_end".to_string(),
        ));
    }
    Ok(())
}

/// `brand_id` never changes once a brief exists.
pub fn ensure_same_brand(expected: &str, given: Option<&str>) -> Result<(), AppError> {
    match given {
        Some(brand_id) if brand_id != expected => Err(AppError::Conflict(
            "BRAND_MISMATCH",
            format!("Brief belongs to brand {}", expected),
        )),
        _ => Ok(()),
    }
}
