//! City endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use inventory_common::{City, CityWithCount};
use serde::Deserialize;

use super::instruments::Deleted;
use super::{ApiResult, Envelope};
use crate::AppState;

/// Body of city and category create/rename requests
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// GET /api/cities
///
/// Every city with its instrument count (archived included).
pub async fn list_cities(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<CityWithCount>>>> {
    Ok(Envelope::ok(state.store.city_counts().await?))
}

/// GET /api/cities/:id
pub async fn get_city(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<City>>> {
    let Path(id) = path?;
    Ok(Envelope::ok(state.store.get_city(id).await?))
}

/// POST /api/cities
pub async fn create_city(
    State(state): State<AppState>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<City>>)> {
    let Json(request) = payload?;
    Ok(Envelope::created(state.store.create_city(&request.name).await?))
}

/// PUT /api/cities/:id
pub async fn rename_city(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<City>>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Envelope::ok(state.store.rename_city(id, &request.name).await?))
}

/// DELETE /api/cities/:id
///
/// 409 while the city still owns instruments.
pub async fn delete_city(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Deleted>>> {
    let Path(id) = path?;
    let id = state.store.delete_city(id).await?;
    Ok(Envelope::ok(Deleted { id }))
}
