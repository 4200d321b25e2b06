//! HTTP surface over [`ReliefService`].
//!
//! JSON in, JSON out. Errors render as `{"message": ...}` with the status
//! chosen in [`ApiError::status`].

mod error;
mod extract;
mod routes;

pub use error::{ApiError, ApiResult};
pub use extract::{ActingUser, MaybeUser, USER_HEADER};

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::ReliefService;
use crate::store::MemoryStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReliefService<MemoryStore>>,
}

impl AppState {
    pub fn new(service: ReliefService<MemoryStore>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/users", post(routes::register_user))
        .route("/api/users/me", get(routes::current_user))
        .route(
            "/api/requests",
            get(routes::list_requests).post(routes::create_request),
        )
        .route("/api/requests/mine", get(routes::my_requests))
        .route("/api/requests/pinged", get(routes::pinged_requests))
        .route("/api/requests/helped", get(routes::helped_requests))
        .route("/api/requests/{id}/approve", post(routes::approve_request))
        .route("/api/requests/{id}/reject", post(routes::reject_request))
        .route("/api/requests/{id}/donate", post(routes::donate_to_request))
        .route("/api/requests/{id}/donations", get(routes::request_donations))
        .route(
            "/api/donations",
            get(routes::list_donations).post(routes::create_donation),
        )
        .route("/api/organizations", get(routes::list_organizations))
        .route("/api/pocs", get(routes::list_pocs))
        .route("/api/stats/urgency", get(routes::urgency_stats))
        .route("/api/stats/categories", get(routes::category_stats))
        .route("/api/notifications", get(routes::list_notifications))
        .route(
            "/api/notifications/{id}/read",
            post(routes::mark_notification_read),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
