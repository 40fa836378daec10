//! # Inventory Common Library
//!
//! Shared code for the instrument inventory service:
//! - Record store (cities, categories, instruments) over SQLite
//! - Lookup string derivation and the archive lifecycle
//! - Instrument query engine (filters, sorting, pagination)
//! - Export projection
//! - Configuration loading and error types

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod lookup;
pub mod models;
pub mod pagination;
pub mod query;
pub mod time;

pub use db::Store;
pub use error::{Error, ErrorKind, Result};
pub use models::{Category, City, CityWithCount, Instrument, InstrumentStatus};
