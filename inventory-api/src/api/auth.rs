//! Authorization middleware for inventory-api
//!
//! Safe methods (GET, HEAD, OPTIONS) pass through. Every other request must
//! carry `Authorization: Basic ...` matching the configured admin
//! credentials. Without configured credentials, nothing is checked.

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use inventory_common::api::auth::ApiAuthError;
use tracing::{debug, warn};

use super::ApiError;
use crate::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(admin) = &state.admin else {
        return Ok(next.run(request).await);
    };

    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    match admin.verify_header(header) {
        Ok(login) => {
            debug!("Authorized {} {} as {}", request.method(), request.uri().path(), login);
            Ok(next.run(request).await)
        }
        Err(err @ ApiAuthError::InvalidCredentials) => {
            warn!(
                "Rejected credentials for {} {}",
                request.method(),
                request.uri().path()
            );
            Err(ApiError::Forbidden(err.to_string()))
        }
        Err(err) => Err(ApiError::Unauthorized(err.to_string())),
    }
}
