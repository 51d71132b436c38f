//! Axum middleware.

pub mod jsonapi;
