//! Boat inventory service: agencies own boats, boats own a dated calendar of
//! availability and rates, and a REST API keeps the three consistent.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validation;

use axum::Router;
use services::inventory_service::InventoryService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// The complete application: API routes, unknown-endpoint fallback, request
/// tracing and CORS.
pub fn app(service: InventoryService) -> Router {
    routes::routes::routes()
        .fallback(handlers::unknown_endpoint)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
