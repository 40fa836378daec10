//! Record store over SQLite
//!
//! [`Store`] is the one handle to the database: opened once at startup,
//! cloned into request handlers, closed on shutdown. Entity operations live
//! in the `cities`, `categories` and `instruments` submodules.

mod categories;
mod cities;
pub mod init;
mod instruments;
pub mod migrations;

pub use init::init_database;

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Shared handle to the inventory database
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) and migrate the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = init_database(db_path).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection; further operations fail
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}

/// Map a UNIQUE violation to [`Error::Conflict`], anything else to a store error
fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> Error {
    if Error::is_unique_violation(&err) {
        Error::Conflict(message())
    } else {
        Error::Database(err)
    }
}
