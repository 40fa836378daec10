//! API helpers shared by transports
//!
//! Contains no HTTP framework dependencies; the axum glue lives in
//! `inventory-api`.

pub mod auth;
