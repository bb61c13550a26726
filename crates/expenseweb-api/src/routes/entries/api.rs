//! Entries API endpoints - JSON API and request parameter parsing
//!
//! Endpoints:
//! - api_entries: Filtered entries with totals (JSON)
//! - api_entry_detail: Single entry (JSON)
//! - api_summary: Totals for a filter (JSON)
//! - api_entry_create: Create from a JSON draft
//! - api_entry_delete: Delete by id

use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::Json;
use expenseweb_core::models::normalize_date;
use expenseweb_core::{
    CategoryFilter, CreateResponse, DeleteResponse, EntriesResponse, Entry, EntryDraft,
    FilterCriteria, Totals, TypeFilter,
};
use std::borrow::Cow;
use std::collections::HashMap;

/// Parameter names carrying filter criteria
pub(crate) struct FilterKeys {
    from: &'static str,
    to: &'static str,
    category: &'static str,
    entry_type: &'static str,
}

/// Filter names on the JSON API
pub(crate) const QUERY_FILTER: FilterKeys = FilterKeys {
    from: "from",
    to: "to",
    category: "category",
    entry_type: "type",
};

/// Filter names in the dashboard filter panel, kept apart from the entry form's fields
pub(crate) const FORM_FILTER: FilterKeys = FilterKeys {
    from: "from",
    to: "to",
    category: "filter_category",
    entry_type: "filter_type",
};

/// Build filter criteria from request parameters. Missing or empty values
/// mean "no constraint"; anything else must be a valid value.
pub(crate) fn parse_criteria(
    params: &HashMap<String, String>,
    keys: &FilterKeys,
) -> Result<FilterCriteria, ApiError> {
    let category = match params.get(keys.category) {
        Some(raw) => raw.parse::<CategoryFilter>()?,
        None => CategoryFilter::All,
    };
    let entry_type = match params.get(keys.entry_type) {
        Some(raw) => raw.parse::<TypeFilter>()?,
        None => TypeFilter::All,
    };

    Ok(FilterCriteria {
        from_date: filter_date(params, keys.from)?,
        to_date: filter_date(params, keys.to)?,
        category,
        entry_type,
    })
}

fn filter_date(params: &HashMap<String, String>, key: &str) -> Result<String, ApiError> {
    match params.get(key).map(|s| s.trim()) {
        None | Some("") => Ok(String::new()),
        Some(raw) => normalize_date(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid date for '{}': {}", key, raw))),
    }
}

/// Build the creation draft from form parameters.
///
/// Title, date and amount are carried as typed; they are only judged when
/// the draft is submitted. Type and category must name a known value.
pub(crate) fn parse_draft(params: &HashMap<String, String>) -> Result<EntryDraft, ApiError> {
    let mut draft = EntryDraft::default();

    if let Some(title) = params.get("title") {
        draft.title = title.clone();
    }
    if let Some(date) = params.get("date") {
        draft.date = date.clone();
    }
    if let Some(amount) = params.get("amount") {
        draft.amount = amount.clone();
    }
    if let Some(raw) = params.get("entry_type").filter(|s| !s.trim().is_empty()) {
        draft.entry_type = raw.parse()?;
    }
    if let Some(raw) = params.get("category").filter(|s| !s.trim().is_empty()) {
        draft.category = raw.parse()?;
    }

    Ok(draft)
}

/// Decode an `application/x-www-form-urlencoded` body
pub(crate) fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| spaced.clone())
}

/// Get filtered entries with totals (JSON API)
pub async fn api_entries(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let criteria = parse_criteria(&params, &QUERY_FILTER)?;
    let store = state.store.read().await;
    Ok(Json(store.query(&criteria)))
}

/// Get single entry (JSON API)
pub async fn api_entry_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    let store = state.store.read().await;
    store
        .entry(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound { resource: format!("entry {}", id) })
}

/// Get totals for a filter (JSON API)
pub async fn api_summary(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Totals>, ApiError> {
    let criteria = parse_criteria(&params, &QUERY_FILTER)?;
    let store = state.store.read().await;
    Ok(Json(store.totals(&criteria)))
}

/// Create an entry from a JSON draft. An incomplete draft is not an error:
/// it answers `created: false`.
pub async fn api_entry_create(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<CreateResponse>, ApiError> {
    let mut draft: EntryDraft = serde_json::from_str(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid entry: {}", e)))?;

    let mut store = state.store.write().await;
    let entry = tokio::task::block_in_place(|| store.create(&mut draft))?;
    Ok(Json(CreateResponse {
        created: entry.is_some(),
        entry,
    }))
}

/// Delete an entry by id
pub async fn api_entry_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut store = state.store.write().await;
    let deleted = tokio::task::block_in_place(|| store.delete(&id))?;
    Ok(Json(DeleteResponse { deleted }))
}
