//! Spaced repetition endpoints
//!
//! Every handler holds the repository lock for its whole load → mutate → save
//! round trip, so concurrent requests for a session never interleave.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use nihongo_core::parser::{parse_bulk, parse_csv};
use nihongo_core::srs::{DueFilter, SpacedRepetitionSystem, MAX_FORECAST_DAYS};

use crate::db::SqliteRepository;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

const DEFAULT_DUE_COUNT: usize = 10;
const DEFAULT_FORECAST_DAYS: u32 = 7;
const MAX_QUALITY: i64 = 5;

type Srs<'r> = SpacedRepetitionSystem<&'r SqliteRepository>;

fn open<'r>(repo: &'r SqliteRepository, session_id: &str) -> Result<Srs<'r>> {
    Ok(SpacedRepetitionSystem::open(repo, session_id)?)
}

fn parse_item_type(raw: Option<&str>) -> Result<Option<ItemType>> {
    raw.map(|raw| {
        raw.parse::<ItemType>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    })
    .transpose()
}

fn item_not_found(item_id: &str) -> ApiError {
    ApiError::NotFound(format!("item {item_id}"))
}

/// GET /api/srs/:session_id/items
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<Vec<SrsItem>>> {
    let item_type = parse_item_type(query.item_type.as_deref())?;
    let tags = split_tags(query.tags.as_deref());

    let repo = state.repository()?;
    let srs = open(&repo, &session_id)?;
    let items = srs
        .items()
        .filter(|item| item_type.map_or(true, |t| item.item_type == t))
        .filter(|item| tags.is_empty() || item.has_any_tag(&tags))
        .cloned()
        .collect();
    Ok(Json(items))
}

/// POST /api/srs/:session_id/items
pub async fn create(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(new_item): Json<NewItem>,
) -> Result<(StatusCode, Json<SrsItem>)> {
    let repo = state.repository()?;
    let mut srs = open(&repo, &session_id)?;
    let item = srs.add_item(new_item)?.clone();
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /api/srs/:session_id/items/bulk
pub async fn bulk_add(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<BulkAddRequest>,
) -> Result<Json<AddedResponse>> {
    let lines = parse_bulk(&request.content);

    let repo = state.repository()?;
    let mut srs = open(&repo, &session_id)?;
    let added = srs.bulk_add_items(lines.into_iter().map(|line| line.record))?;

    tracing::info!(session_id = %session_id, added, "bulk items added");
    Ok(Json(AddedResponse { added }))
}

/// POST /api/srs/:session_id/items/import
///
/// Records are decoded one by one so a malformed record is skipped rather
/// than failing the batch.
pub async fn import(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(values): Json<Vec<serde_json::Value>>,
) -> Result<Json<AddedResponse>> {
    let total = values.len();
    let records: Vec<ImportRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(index, error = %err, "skipping malformed item record");
                None
            }
        })
        .collect();

    import_records(&state, &session_id, records, total)
}

/// POST /api/srs/:session_id/items/import/csv
///
/// Takes the CSV text as the request body.
pub async fn import_csv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: String,
) -> Result<Json<AddedResponse>> {
    let records = parse_csv(&body)?;
    let total = records.len();
    import_records(&state, &session_id, records, total)
}

fn import_records(
    state: &AppState,
    session_id: &str,
    records: Vec<ImportRecord>,
    total: usize,
) -> Result<Json<AddedResponse>> {
    let repo = state.repository()?;
    let mut srs = open(&repo, session_id)?;
    let added = srs.import_items(records)?;

    if added < total {
        tracing::warn!(session_id, skipped = total - added, "skipped incomplete item records");
    }
    Ok(Json(AddedResponse { added }))
}

/// DELETE /api/srs/:session_id/items
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearedResponse>> {
    let repo = state.repository()?;
    let removed = open(&repo, &session_id)?.clear()?;
    Ok(Json(ClearedResponse { removed }))
}

/// GET /api/srs/:session_id/items/export
pub async fn export(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<SrsItem>>> {
    let repo = state.repository()?;
    Ok(Json(open(&repo, &session_id)?.export_items()))
}

/// GET /api/srs/:session_id/items/:item_id
pub async fn get_item(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, String)>,
) -> Result<Json<SrsItem>> {
    let repo = state.repository()?;
    let srs = open(&repo, &session_id)?;
    let item = srs
        .get_item(&item_id)
        .cloned()
        .ok_or_else(|| item_not_found(&item_id))?;
    Ok(Json(item))
}

/// PUT /api/srs/:session_id/items/:item_id
pub async fn update(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, String)>,
    Json(update): Json<ItemUpdate>,
) -> Result<Json<SrsItem>> {
    let repo = state.repository()?;
    let mut srs = open(&repo, &session_id)?;
    if !srs.update_item(&item_id, update)? {
        return Err(item_not_found(&item_id));
    }

    let item = srs
        .get_item(&item_id)
        .cloned()
        .ok_or_else(|| item_not_found(&item_id))?;
    Ok(Json(item))
}

/// DELETE /api/srs/:session_id/items/:item_id
pub async fn delete(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let repo = state.repository()?;
    let mut srs = open(&repo, &session_id)?;
    if !srs.delete_item(&item_id)? {
        return Err(item_not_found(&item_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/srs/:session_id/items/:item_id/review
pub async fn review(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, String)>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    if !(0..=MAX_QUALITY).contains(&request.quality) {
        return Err(ApiError::BadRequest(format!(
            "quality must be between 0 and {MAX_QUALITY}, got {}",
            request.quality
        )));
    }
    let quality = request.quality as u8;

    let repo = state.repository()?;
    let mut srs = open(&repo, &session_id)?;
    srs.review_item(&item_id, quality)?
        .ok_or_else(|| item_not_found(&item_id))?;

    let item = srs
        .get_item(&item_id)
        .ok_or_else(|| item_not_found(&item_id))?;
    Ok(Json(ReviewResponse {
        item_id: item.item_id.clone(),
        interval: item.interval,
        ease_factor: item.ease_factor,
        next_review: item.next_review,
    }))
}

/// GET /api/srs/:session_id/due
pub async fn due(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<SrsItem>>> {
    let filter = DueFilter {
        item_type: parse_item_type(query.item_type.as_deref())?,
        tags: split_tags(query.tags.as_deref()),
    };
    let count = query.count.unwrap_or(DEFAULT_DUE_COUNT);

    let repo = state.repository()?;
    let srs = open(&repo, &session_id)?;
    let due = srs.due_items(count, &filter).into_iter().cloned().collect();
    Ok(Json(due))
}

/// GET /api/srs/:session_id/forecast
pub async fn forecast(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Vec<DayCount>>> {
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    if days > MAX_FORECAST_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be at most {MAX_FORECAST_DAYS}"
        )));
    }

    let repo = state.repository()?;
    Ok(Json(open(&repo, &session_id)?.review_forecast(days)))
}

/// GET /api/srs/:session_id/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Statistics>> {
    let repo = state.repository()?;
    Ok(Json(open(&repo, &session_id)?.statistics()))
}
