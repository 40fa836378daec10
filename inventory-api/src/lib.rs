//! inventory-api library - HTTP surface of the instrument inventory
//!
//! Read routes are public. Mutating routes go through HTTP Basic
//! authorization when admin credentials are configured.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use inventory_common::api::auth::AdminCredentials;
use inventory_common::Store;
use tower_http::cors::CorsLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// `None` disables authorization of mutating routes
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    pub fn new(store: Store, admin: Option<AdminCredentials>) -> Self {
        Self { store, admin }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, patch};

    let api = Router::new()
        .route(
            "/api/instruments",
            get(api::list_instruments).post(api::create_instrument),
        )
        .route(
            "/api/instruments/:id",
            get(api::get_instrument)
                .put(api::update_instrument)
                .delete(api::delete_instrument),
        )
        .route("/api/instruments/:id/archive", patch(api::set_archived))
        .route("/api/cities", get(api::list_cities).post(api::create_city))
        .route(
            "/api/cities/:id",
            get(api::get_city)
                .put(api::rename_city)
                .delete(api::delete_city),
        )
        .route(
            "/api/categories",
            get(api::list_categories).post(api::create_category),
        )
        .route(
            "/api/categories/:id",
            get(api::get_category)
                .put(api::rename_category)
                .delete(api::delete_category),
        )
        .route("/api/export/instruments", get(api::export_json))
        .route("/api/export/instruments.csv", get(api::export_csv))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .with_state(state)
}

/// CORS policy allowing the configured front-end origin
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
