//! Grammar check endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, Utc};

use crate::db::{CheckRepository, ProgressRepository};
use crate::error::Result;
use crate::models::*;
use crate::AppState;

const DEFAULT_CHECK_LIMIT: usize = 10;

/// POST /api/grammar/check
pub async fn check(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<AnalysisResult>> {
    let result = state.checker()?.check_grammar(&request.text);

    if let Some(session_id) = request.session_id.as_deref() {
        let repo = state.repository()?;
        repo.insert_check(session_id, &request.text, &result, Utc::now())?;

        let mut progress = repo
            .get_progress(session_id)?
            .unwrap_or_else(|| UserProgress::new(session_id));
        progress.record_analysis(&result, Local::now().date_naive());
        repo.save_progress(&progress)?;

        tracing::debug!(
            session_id,
            issues = result.grammar_issues.len(),
            total_checks = progress.total_checks,
            "grammar check recorded"
        );
    }

    Ok(Json(result))
}

/// GET /api/grammar/checks
pub async fn recent_checks(
    State(state): State<AppState>,
    Query(query): Query<ChecksQuery>,
) -> Result<Json<Vec<GrammarCheck>>> {
    let limit = query.limit.unwrap_or(DEFAULT_CHECK_LIMIT);
    let checks = state
        .repository()?
        .recent_checks(query.session_id.as_deref(), limit)?;
    Ok(Json(checks))
}
