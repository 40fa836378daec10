//! HTTP API handlers for inventory-api

pub mod auth;
pub mod categories;
pub mod cities;
pub mod error;
pub mod export;
pub mod health;
pub mod instruments;

pub use auth::auth_middleware;
pub use categories::{create_category, delete_category, get_category, list_categories, rename_category};
pub use cities::{create_city, delete_city, get_city, list_cities, rename_city};
pub use error::{ApiError, ApiResult, Envelope};
pub use export::{export_csv, export_json};
pub use health::health_routes;
pub use instruments::{
    create_instrument, delete_instrument, get_instrument, list_instruments, set_archived,
    update_instrument,
};
