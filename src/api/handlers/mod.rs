pub mod admin;
pub mod auth;
pub mod brands;
pub mod briefs;
pub mod creatives;
pub mod health;
pub mod portfolios;
pub mod reactions;
pub mod submissions;
pub mod tags;
pub mod uploads;
pub mod users;

use crate::AppState;
use crate::api::error::AppError;
use crate::entities::types::StoredFile;
use crate::services::upload_service::IncomingFile;
use crate::utils::validation::validate_stored_files;
use axum::extract::Multipart;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// `(offset, limit)` for 1-based `page` and `per_page` query parameters.
/// The offset saturates at the largest value a signed SQL `OFFSET` accepts.
pub fn page_bounds(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let offset = (page - 1).saturating_mul(per_page).min(i64::MAX as u64);
    (offset, per_page)
}

/// Validate file descriptors sent inside JSON bodies.
pub fn check_files(state: &AppState, files: &[StoredFile]) -> Result<(), AppError> {
    validate_stored_files(files, state.config.storage.max_file_size)
        .map_err(|e| AppError::Validation(e.root_cause().to_string()))
}

/// Collect every file part of a multipart body, refusing more than `max_files`.
pub async fn read_files(
    multipart: &mut Multipart,
    max_files: usize,
) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(|f| f.to_string()) else {
            continue;
        };
        if files.len() == max_files {
            return Err(AppError::PayloadTooLarge(format!(
                "At most {} files per request",
                max_files
            )));
        }

        let content_type = field.content_type().map(|c| c.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
            .to_vec();

        files.push(IncomingFile {
            filename,
            content_type,
            data,
        });
    }

    Ok(files)
}
