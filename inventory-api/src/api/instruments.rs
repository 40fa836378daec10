//! Instrument endpoints: listing, CRUD and archive toggle
//!
//! Query parameters are parsed leniently: numbers that fail to parse and
//! unknown sort columns fall back to their defaults. An unknown `status`
//! is a 400.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use inventory_common::models::InstrumentFields;
use inventory_common::pagination::PageRequest;
use inventory_common::query::{InstrumentFilter, InstrumentPage, Sort};
use inventory_common::{Instrument, InstrumentStatus};
use serde::{Deserialize, Serialize};

use super::{ApiResult, Envelope};
use crate::AppState;

/// Filter, sort and page parameters shared by listing and export
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub city_id: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub archived: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

impl ListQuery {
    pub fn filter(&self) -> ApiResult<InstrumentFilter> {
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<InstrumentStatus>()?),
            None => None,
        };

        Ok(InstrumentFilter {
            city_id: parse_number(self.city_id.as_deref()),
            category: self.category.clone().filter(|c| !c.is_empty()),
            status,
            search: self.q.clone().filter(|q| !q.is_empty()),
            archived: matches!(self.archived.as_deref(), Some("1") | Some("true")),
        })
    }

    pub fn sort(&self) -> Sort {
        Sort::parse_lenient(self.sort_by.as_deref(), self.order.as_deref())
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(
            parse_number(self.page.as_deref()),
            parse_number(self.page_size.as_deref()),
        )
    }
}

/// GET /api/instruments
pub async fn list_instruments(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<InstrumentPage>>> {
    let Query(query) = query?;
    let page = state
        .store
        .list_instruments(&query.filter()?, query.sort(), query.page())
        .await?;

    Ok(Envelope::ok(page))
}

/// GET /api/instruments/:id
pub async fn get_instrument(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Instrument>>> {
    let Path(id) = path?;
    Ok(Envelope::ok(state.store.get_instrument(id).await?))
}

/// POST /api/instruments
pub async fn create_instrument(
    State(state): State<AppState>,
    payload: Result<Json<InstrumentFields>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Instrument>>)> {
    let Json(fields) = payload?;
    let instrument = state.store.create_instrument(fields).await?;
    Ok(Envelope::created(instrument))
}

/// PUT /api/instruments/:id
pub async fn update_instrument(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<InstrumentFields>, JsonRejection>,
) -> ApiResult<Json<Envelope<Instrument>>> {
    let Path(id) = path?;
    let Json(fields) = payload?;
    Ok(Envelope::ok(state.store.update_instrument(id, fields).await?))
}

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub archived: bool,
}

/// PATCH /api/instruments/:id/archive
pub async fn set_archived(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ArchiveRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Instrument>>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Envelope::ok(
        state.store.set_archived(id, request.archived).await?,
    ))
}

/// Identifier of a deleted record
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
}

/// DELETE /api/instruments/:id
pub async fn delete_instrument(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Deleted>>> {
    let Path(id) = path?;
    let id = state.store.delete_instrument(id).await?;
    Ok(Envelope::ok(Deleted { id }))
}
