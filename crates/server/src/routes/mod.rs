//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Customers
//! GET  /api/customers              - Full customer list
//! GET  /api/customers/{id}         - Single customer
//! POST /api/customers/scan         - Random customer (simulated NFC/QR scan)
//! POST /api/customers/{id}/points  - Award points, body {"points": n}
//! ```

pub mod customers;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/customers", get(customers::list))
        .route("/api/customers/{id}", get(customers::get_by_id))
        .route("/api/customers/scan", post(customers::scan))
        .route("/api/customers/{id}/points", post(customers::add_points))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> StatusCode {
    StatusCode::OK
}
