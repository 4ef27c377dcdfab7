//! Progress endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::ProgressRepository;
use crate::error::Result;
use crate::models::UserProgress;
use crate::AppState;

/// GET /api/progress/:session_id
///
/// A session without checks gets zeroed progress.
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<UserProgress>> {
    let progress = state
        .repository()?
        .get_progress(&session_id)?
        .unwrap_or_else(|| UserProgress::new(session_id));
    Ok(Json(progress))
}
