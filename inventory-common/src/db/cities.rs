//! City records and per-city instrument counts

use tracing::info;

use super::{conflict_on_unique, Store};
use crate::models::{validate_label_name, City, CityWithCount};
use crate::{Error, Result};

impl Store {
    /// Every city with the number of instruments referencing it, by name
    ///
    /// Counts include archived instruments; cities without instruments
    /// report 0.
    pub async fn city_counts(&self) -> Result<Vec<CityWithCount>> {
        let cities = sqlx::query_as::<_, CityWithCount>(
            r#"
            SELECT c.id, c.name, c.created_at, COUNT(i.id) AS instruments_count
            FROM cities c
            LEFT JOIN instruments i ON i.city_id = c.id
            GROUP BY c.id
            ORDER BY c.name, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }

    pub async fn get_city(&self, id: i64) -> Result<City> {
        sqlx::query_as::<_, City>("SELECT id, name, created_at FROM cities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("City {} not found", id)))
    }

    /// Insert a city; the UNIQUE constraint decides duplicates
    pub async fn create_city(&self, name: &str) -> Result<City> {
        let name = validate_label_name(name, "City name")?;

        let city = sqlx::query_as::<_, City>(
            "INSERT INTO cities (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(crate::time::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("City '{}' already exists", name)))?;

        info!("Created city {} ({})", city.id, city.name);
        Ok(city)
    }

    pub async fn rename_city(&self, id: i64, name: &str) -> Result<City> {
        let name = validate_label_name(name, "City name")?;

        sqlx::query_as::<_, City>(
            "UPDATE cities SET name = ? WHERE id = ? RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("City '{}' already exists", name)))?
        .ok_or_else(|| Error::NotFound(format!("City {} not found", id)))
    }

    /// Delete a city that owns no instruments
    ///
    /// The emptiness check and the delete are one statement, so an instrument
    /// inserted concurrently can never be cascaded away.
    pub async fn delete_city(&self, id: i64) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM cities
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM instruments WHERE city_id = ?)
            "#,
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            let dependents: Option<i64> = sqlx::query_scalar(
                "SELECT (SELECT COUNT(*) FROM instruments WHERE city_id = c.id) FROM cities c WHERE c.id = ?",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            return Err(match dependents {
                None => Error::NotFound(format!("City {} not found", id)),
                Some(count) => Error::Conflict(format!(
                    "Cannot delete city {}: it still has {} instruments",
                    id, count
                )),
            });
        }

        tx.commit().await?;
        info!("Deleted city {}", id);
        Ok(id)
    }
}
