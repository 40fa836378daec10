//! Instrument records: CRUD, archive lifecycle, listing and export
//!
//! Every write computes the lookup string and the archived flag in the same
//! statement that changes name, category or quantity.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info};

use super::Store;
use crate::export::ExportRow;
use crate::lifecycle::{forces_archive, initial_state, requested_state};
use crate::lookup::build_lookup;
use crate::models::{Instrument, InstrumentFields};
use crate::pagination::{calculate_pagination, PageRequest};
use crate::query::{InstrumentFilter, InstrumentPage, Sort};
use crate::{Error, Result};

/// Instrument columns joined with the owning city's name
const SELECT_INSTRUMENT: &str = r#"
    SELECT i.id, i.city_id, COALESCE(c.name, '') AS city_name, i.name, i.category,
           i.quantity, i.received_at, i.status, i.note, COALESCE(i.lookup, '') AS lookup,
           i.archived, i.created_at
    FROM instruments i
    LEFT JOIN cities c ON c.id = i.city_id"#;

async fn fetch_instrument(conn: &mut SqliteConnection, id: i64) -> Result<Option<Instrument>> {
    let sql = format!("{} WHERE i.id = ?", SELECT_INSTRUMENT);
    let instrument = sqlx::query_as::<_, Instrument>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(instrument)
}

fn instrument_not_found(id: i64) -> Error {
    Error::NotFound(format!("Instrument {} not found", id))
}

/// A FOREIGN KEY failure on an instrument write means the city is gone
fn missing_city(err: sqlx::Error, city_id: i64) -> Error {
    if Error::is_foreign_key_violation(&err) {
        Error::NotFound(format!("City {} not found", city_id))
    } else {
        Error::Database(err)
    }
}

impl Store {
    pub async fn get_instrument(&self, id: i64) -> Result<Instrument> {
        let mut conn = self.pool.acquire().await?;
        fetch_instrument(&mut conn, id)
            .await?
            .ok_or_else(|| instrument_not_found(id))
    }

    /// Insert an instrument
    ///
    /// An instrument created with quantity 0 starts archived.
    pub async fn create_instrument(&self, fields: InstrumentFields) -> Result<Instrument> {
        let fields = fields.validate()?;
        let lookup = build_lookup(&fields.name, fields.category.as_deref());
        let archived = initial_state(fields.quantity).is_archived();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO instruments
                (city_id, name, category, quantity, received_at, status, note, lookup, archived, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.city_id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.quantity)
        .bind(fields.received_at)
        .bind(fields.status)
        .bind(&fields.note)
        .bind(&lookup)
        .bind(archived)
        .bind(crate::time::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_city(e, fields.city_id))?;

        let id = inserted.last_insert_rowid();
        let instrument = fetch_instrument(&mut tx, id)
            .await?
            .ok_or_else(|| instrument_not_found(id))?;

        tx.commit().await?;

        info!(
            "Created instrument {} in city {} (archived: {})",
            instrument.id, instrument.city_id, instrument.archived
        );
        Ok(instrument)
    }

    /// Replace an instrument's editable fields
    ///
    /// Writing quantity 0 archives the instrument; any other quantity leaves
    /// the archived flag as it was.
    pub async fn update_instrument(&self, id: i64, fields: InstrumentFields) -> Result<Instrument> {
        let fields = fields.validate()?;
        let lookup = build_lookup(&fields.name, fields.category.as_deref());
        let force_archive = forces_archive(fields.quantity);

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE instruments
            SET city_id = ?, name = ?, category = ?, quantity = ?, received_at = ?,
                status = ?, note = ?, lookup = ?, archived = (archived OR ?)
            WHERE id = ?
            "#,
        )
        .bind(fields.city_id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.quantity)
        .bind(fields.received_at)
        .bind(fields.status)
        .bind(&fields.note)
        .bind(&lookup)
        .bind(force_archive)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_city(e, fields.city_id))?;

        if updated.rows_affected() == 0 {
            return Err(instrument_not_found(id));
        }

        let instrument = fetch_instrument(&mut tx, id)
            .await?
            .ok_or_else(|| instrument_not_found(id))?;

        tx.commit().await?;

        if force_archive {
            info!("Instrument {} archived: quantity set to 0", id);
        }
        Ok(instrument)
    }

    /// Explicitly archive (`true`) or restore (`false`) an instrument
    ///
    /// Idempotent; no other field changes.
    pub async fn set_archived(&self, id: i64, archived: bool) -> Result<Instrument> {
        let target = requested_state(archived);

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE instruments SET archived = ? WHERE id = ?")
            .bind(target.is_archived())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(instrument_not_found(id));
        }

        let instrument = fetch_instrument(&mut tx, id)
            .await?
            .ok_or_else(|| instrument_not_found(id))?;

        tx.commit().await?;

        info!("Instrument {} lifecycle set to {:?}", id, target);
        Ok(instrument)
    }

    pub async fn delete_instrument(&self, id: i64) -> Result<i64> {
        let deleted = sqlx::query("DELETE FROM instruments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(instrument_not_found(id));
        }

        info!("Deleted instrument {}", id);
        Ok(id)
    }

    /// One page of instruments matching `filter`, plus the total match count
    ///
    /// Count and page run inside one transaction against the same predicate,
    /// so both observe the same snapshot.
    pub async fn list_instruments(
        &self,
        filter: &InstrumentFilter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<InstrumentPage> {
        let predicate = filter.predicate();

        let mut tx = self.pool.begin().await?;

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM instruments i");
        predicate.push_where(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;

        let pagination = calculate_pagination(total, page);

        let mut page_query = QueryBuilder::<Sqlite>::new(SELECT_INSTRUMENT);
        predicate.push_where(&mut page_query);
        sort.push_order_by(&mut page_query);
        page_query
            .push(" LIMIT ")
            .push_bind(pagination.page_size)
            .push(" OFFSET ")
            .push_bind(pagination.offset);

        debug!("Instrument page query: {}", page_query.sql());

        let items = page_query
            .build_query_as::<Instrument>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(InstrumentPage {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages,
        })
    }

    /// Every instrument matching `filter` as flat export rows, unpaginated
    ///
    /// The filter's `archived` flag applies as in listings: a default filter
    /// exports active instruments only, unlike the legacy spreadsheet export
    /// which mixed active and archived rows.
    pub async fn export_rows(&self, filter: &InstrumentFilter, sort: Sort) -> Result<Vec<ExportRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_INSTRUMENT);
        filter.predicate().push_where(&mut query);
        sort.push_order_by(&mut query);

        let instruments = query
            .build_query_as::<Instrument>()
            .fetch_all(&self.pool)
            .await?;

        Ok(instruments.iter().map(ExportRow::from).collect())
    }
}
