use crate::error::{AppError, Result, ENTRY_NOT_FOUND, INVALID_STATUS, USER_NOT_FOUND};
use crate::extract::{JsonBody, QueryParams};
use crate::models::{
    EntryFilter, EntryPayload, EntrySearchParams, EntryStatus, EntryType, FinancialEntry,
    StatusPayload,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;

/// GET /api/entries?description=&month=&year=&type=&status=&user=
pub async fn search_entries_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EntrySearchParams>,
) -> Result<Json<Vec<FinancialEntry>>> {
    let user_id = params
        .user
        .ok_or_else(|| AppError::BadRequest("provide a user".to_string()))?;
    let owner = resolve_user(&state, user_id).await?;

    let filter = EntryFilter {
        user_id: owner,
        description: params.description.filter(|d| !d.is_empty()),
        month: params.month,
        year: params.year,
        entry_type: parse_field(params.entry_type, "invalid entry type")?,
        status: parse_field(params.status, "invalid entry status")?,
    };

    let entries = state.entry_service.search(&filter).await?;
    Ok(Json(entries))
}

/// GET /api/entries/{id}
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FinancialEntry>> {
    Ok(Json(find_entry(&state, id).await?))
}

/// POST /api/entries
pub async fn create_entry_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EntryPayload>,
) -> Result<(StatusCode, Json<FinancialEntry>)> {
    let entry = into_entry(&state, payload).await?;
    let saved = state.entry_service.save(entry).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /api/entries/{id}
pub async fn update_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<EntryPayload>,
) -> Result<Json<FinancialEntry>> {
    let existing = find_entry(&state, id).await?;

    let mut entry = into_entry(&state, payload).await?;
    entry.id = existing.id;

    Ok(Json(state.entry_service.update(entry).await?))
}

/// PUT /api/entries/{id}/status
pub async fn update_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<StatusPayload>,
) -> Result<Json<FinancialEntry>> {
    let entry = find_entry(&state, id).await?;

    let status = payload
        .status
        .as_deref()
        .and_then(|s| EntryStatus::from_str(s).ok())
        .ok_or_else(|| AppError::BadRequest(INVALID_STATUS.to_string()))?;

    Ok(Json(state.entry_service.update_status(entry, status).await?))
}

/// DELETE /api/entries/{id}
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let entry = find_entry(&state, id).await?;
    state.entry_service.delete(&entry).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_entry(state: &AppState, id: i64) -> Result<FinancialEntry> {
    state
        .entry_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::BadRequest(ENTRY_NOT_FOUND.to_string()))
}

async fn resolve_user(state: &AppState, user_id: i64) -> Result<i64> {
    state
        .user_service
        .find_by_id(user_id)
        .await?
        .map(|user| user.id)
        .ok_or_else(|| AppError::BadRequest(USER_NOT_FOUND.to_string()))
}

/// Converts the request body, resolving the owner. A missing owner is left
/// for entry validation to report.
async fn into_entry(state: &AppState, payload: EntryPayload) -> Result<FinancialEntry> {
    let user_id = match payload.user {
        Some(id) => Some(resolve_user(state, id).await?),
        None => None,
    };

    Ok(FinancialEntry {
        id: None,
        description: payload.description,
        month: payload.month,
        year: payload.year,
        value: payload.value,
        entry_type: parse_field::<EntryType>(payload.entry_type, "invalid entry type")?,
        status: parse_field::<EntryStatus>(payload.status, "invalid entry status")?,
        user_id,
        created_at: None,
    })
}

fn parse_field<T: FromStr>(raw: Option<String>, message: &str) -> Result<Option<T>> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(|_| AppError::BadRequest(message.to_string()))
}
