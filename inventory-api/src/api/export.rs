//! Export endpoints
//!
//! Same filter and sort parameters as the instrument listing, without
//! pagination. `archived` defaults to false here too, so a plain export
//! holds active instruments only. The legacy spreadsheet export included
//! archived rows; pass `archived=1` for those.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use inventory_common::export::{ExportRow, EXPORT_COLUMNS};
use tracing::info;

use super::instruments::ListQuery;
use super::{ApiError, ApiResult, Envelope};
use crate::AppState;

/// GET /api/export/instruments
pub async fn export_json(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Vec<ExportRow>>>> {
    let Query(query) = query?;
    let rows = state
        .store
        .export_rows(&query.filter()?, query.sort())
        .await?;

    Ok(Envelope::ok(rows))
}

/// GET /api/export/instruments.csv
pub async fn export_csv(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let rows = state
        .store
        .export_rows(&query.filter()?, query.sort())
        .await?;

    let body = render_csv(&rows)?;
    info!("Exported {} instruments as CSV", rows.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"instruments.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// Header row of column titles followed by one record per row
pub fn render_csv(rows: &[ExportRow]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| ApiError::Internal(format!("CSV write failed: {}", e)))?;
    for row in rows {
        writer
            .write_record(row.cells())
            .map_err(|e| ApiError::Internal(format!("CSV write failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {}", e)))
}
