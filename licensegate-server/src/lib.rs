//! Licensegate license-authorization service.
//!
//! Decides whether a named client is currently entitled to use the product,
//! issues short-lived signed access tokens to entitled clients, and lets an
//! operator toggle entitlement at runtime.
//!
//! # Endpoints
//!
//! - `GET /check?client=ID`: `{licensed, accessToken?}`
//! - `GET /validate?token=TOKEN`: `{valid}` (401 when invalid)
//! - `POST /admin/enable`, `POST /admin/disable`: toggle a client (admin secret)
//! - `GET /admin/status`: list enabled clients (admin secret)

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod service;

use axum::routing::{get, post};
use axum::{Router, middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use auth::AdminSecret;
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use service::{AuthorizationService, LicenseCheck};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: Arc<AuthorizationService>,
    pub admin_secret: Arc<AdminSecret>,
}

impl AppState {
    pub fn new(service: AuthorizationService, admin_secret: AdminSecret) -> Self {
        Self {
            service: Arc::new(service),
            admin_secret: Arc::new(admin_secret),
        }
    }
}

/// Build the HTTP router with the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/check", get(routes::check))
        .route("/validate", get(routes::validate))
        .route("/admin/enable", post(routes::admin_enable))
        .route("/admin/disable", post(routes::admin_disable))
        .route("/admin/status", get(routes::admin_status))
        .fallback(routes::not_found)
        .layer(middleware::from_fn(cors::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
