//! Database initialization
//!
//! Opens (creating if needed) the SQLite file, creates the schema, runs
//! migrations and seeds the default cities and categories on an empty
//! database. Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Cities inserted into an empty database
pub const DEFAULT_CITIES: [&str; 3] = ["Москва", "Краснодар", "Волгоград"];

/// Categories inserted into an empty database
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Врачам", "Студентам", "Зуботехникам"];

/// How long a connection waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database file and bring its schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Per-connection options: every pooled connection enforces foreign keys
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema_version_table(&pool).await?;
    create_cities_table(&pool).await?;
    create_categories_table(&pool).await?;
    create_instruments_table(&pool).await?;

    // Legacy databases may predate columns the indexes below rely on
    crate::db::migrations::run_migrations(&pool).await?;

    create_instrument_indexes(&pool).await?;
    seed_defaults(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_cities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the instruments table
///
/// `category` is a plain label, not a foreign key: deleting a category
/// leaves existing labels in place.
async fn create_instruments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS instruments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            category TEXT,
            quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
            received_at DATE,
            status TEXT NOT NULL DEFAULT 'available',
            note TEXT,
            lookup TEXT NOT NULL DEFAULT '',
            archived BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (city_id) REFERENCES cities(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_instrument_indexes(pool: &SqlitePool) -> Result<()> {
    for (index, column) in [
        ("idx_instruments_city", "city_id"),
        ("idx_instruments_category", "category"),
        ("idx_instruments_status", "status"),
        ("idx_instruments_received", "received_at"),
        ("idx_instruments_quantity", "quantity"),
        ("idx_instruments_lookup", "lookup"),
        ("idx_instruments_archived", "archived"),
    ] {
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {} ON instruments({})",
            index, column
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

/// Insert the default cities and categories into empty tables
async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    let cities: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
        .fetch_one(pool)
        .await?;
    if cities == 0 {
        for name in DEFAULT_CITIES {
            sqlx::query("INSERT OR IGNORE INTO cities (name, created_at) VALUES (?, ?)")
                .bind(name)
                .bind(crate::time::now())
                .execute(pool)
                .await?;
        }
        info!("Seeded {} default cities", DEFAULT_CITIES.len());
    }

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if categories == 0 {
        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT OR IGNORE INTO categories (name, created_at) VALUES (?, ?)")
                .bind(name)
                .bind(crate::time::now())
                .execute(pool)
                .await?;
        }
        info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
    }

    Ok(())
}
