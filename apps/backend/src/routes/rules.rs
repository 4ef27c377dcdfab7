//! Grammar rule endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use nihongo_core::grammar::validate_custom_rule;

use crate::db::{CustomRuleRepository, SqliteRepository};
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/rules/rejected
pub async fn rejected(State(state): State<AppState>) -> Result<Json<Vec<RejectedRule>>> {
    let checker = state.checker()?;
    let rejected = checker
        .rejected_rules()
        .map(|err| RejectedRule {
            rule: err.rule_name().map(str::to_string),
            message: err.to_string(),
        })
        .collect();
    Ok(Json(rejected))
}

/// GET /api/rules/custom
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomRule>>> {
    let rules = state.repository()?.list_custom_rules()?;
    Ok(Json(rules))
}

/// POST /api/rules/custom
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CustomRuleRequest>,
) -> Result<(StatusCode, Json<CustomRule>)> {
    let rule = request.into_rule(0);
    validate_custom_rule(&rule)?;

    let repo = state.repository()?;
    let created = repo.create_custom_rule(&rule)?;
    reload_custom_rules(&state, &repo)?;

    tracing::info!(id = created.id, name = %created.name, "custom rule added");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/rules/custom/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CustomRuleRequest>,
) -> Result<Json<CustomRule>> {
    let rule = request.into_rule(id);
    validate_custom_rule(&rule)?;

    let repo = state.repository()?;
    let updated = repo
        .update_custom_rule(&rule)?
        .ok_or_else(|| ApiError::NotFound(format!("custom rule {id}")))?;
    reload_custom_rules(&state, &repo)?;

    Ok(Json(updated))
}

/// DELETE /api/rules/custom/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    let repo = state.repository()?;
    if !repo.deactivate_custom_rule(id)? {
        return Err(ApiError::NotFound(format!("custom rule {id}")));
    }
    reload_custom_rules(&state, &repo)?;

    tracing::info!(id, "custom rule deactivated");
    Ok(StatusCode::NO_CONTENT)
}

fn reload_custom_rules(state: &AppState, repo: &SqliteRepository) -> Result<()> {
    state.checker_mut()?.reload_custom_rules(repo)?;
    Ok(())
}
