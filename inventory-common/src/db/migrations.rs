//! Database schema migrations
//!
//! Versioned, idempotent upgrades for databases created by earlier releases.
//! Progress is tracked in the `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - they must remain stable for users upgrading from older versions
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve data

use crate::lookup::build_lookup;
use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database
///
/// Returns 0 if the schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Add archived column to instruments
///
/// **Background:** early databases tracked instruments without a soft-archive
/// flag.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add archived column to instruments");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('instruments') WHERE name = 'archived'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  archived column already exists - skipping");
        return Ok(());
    }

    // Catch duplicate column error when two processes initialize concurrently
    match sqlx::query("ALTER TABLE instruments ADD COLUMN archived BOOLEAN NOT NULL DEFAULT 0")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  ✓ Added archived column to instruments table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  archived column added concurrently - skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Migration v2: Rename legacy statuses and archive empty stock
///
/// **Background:** statuses used to be `new`/`repair`/`disposed`. Instruments
/// left at quantity 0 by older releases were never archived.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Legacy statuses and zero-quantity archive");

    let mut tx = pool.begin().await?;

    for (legacy, current) in [
        ("new", "available"),
        ("repair", "in_transit"),
        ("disposed", "out_of_stock"),
    ] {
        let result = sqlx::query("UPDATE instruments SET status = ? WHERE status = ?")
            .bind(current)
            .bind(legacy)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() > 0 {
            info!(
                "  ✓ Status '{}' -> '{}' on {} instruments",
                legacy,
                current,
                result.rows_affected()
            );
        }
    }

    let archived =
        sqlx::query("UPDATE instruments SET archived = 1 WHERE quantity = 0 AND archived = 0")
            .execute(&mut *tx)
            .await?;
    if archived.rows_affected() > 0 {
        info!(
            "  ✓ Archived {} instruments with zero quantity",
            archived.rows_affected()
        );
    }

    tx.commit().await?;
    Ok(())
}

/// Migration v3: Backfill missing lookup strings
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Backfill instrument lookup strings");

    let rows: Vec<(i64, String, Option<String>)> = sqlx::query_as(
        "SELECT id, name, category FROM instruments WHERE lookup IS NULL OR lookup = ''",
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        info!("  No instruments need a lookup backfill - skipping");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (id, name, category) in &rows {
        sqlx::query("UPDATE instruments SET lookup = ? WHERE id = ?")
            .bind(build_lookup(name, category.as_deref()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!("  ✓ Backfilled lookup for {} instruments", rows.len());
    Ok(())
}
