//! Category records
//!
//! Instruments reference categories by name only. Renaming or deleting a
//! category leaves existing instrument labels untouched.

use tracing::info;

use super::{conflict_on_unique, Store};
use crate::models::{validate_label_name, Category};
use crate::{Error, Result};

impl Store {
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", id)))
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let name = validate_label_name(name, "Category name")?;

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(crate::time::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Category '{}' already exists", name)))?;

        info!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    pub async fn rename_category(&self, id: i64, name: &str) -> Result<Category> {
        let name = validate_label_name(name, "Category name")?;

        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ? WHERE id = ? RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Category '{}' already exists", name)))?
        .ok_or_else(|| Error::NotFound(format!("Category {} not found", id)))
    }

    pub async fn delete_category(&self, id: i64) -> Result<i64> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Category {} not found", id)));
        }

        info!("Deleted category {}", id);
        Ok(id)
    }
}
