//! Category endpoints
//!
//! Categories are labels: deleting one leaves instruments that carry its
//! name untouched.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use inventory_common::Category;

use super::cities::NameRequest;
use super::instruments::Deleted;
use super::{ApiResult, Envelope};
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Category>>>> {
    Ok(Envelope::ok(state.store.list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Category>>> {
    let Path(id) = path?;
    Ok(Envelope::ok(state.store.get_category(id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Category>>)> {
    let Json(request) = payload?;
    Ok(Envelope::created(
        state.store.create_category(&request.name).await?,
    ))
}

pub async fn rename_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Category>>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Envelope::ok(
        state.store.rename_category(id, &request.name).await?,
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Deleted>>> {
    let Path(id) = path?;
    let id = state.store.delete_category(id).await?;
    Ok(Envelope::ok(Deleted { id }))
}
