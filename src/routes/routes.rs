//! Defines routes for the agency, boat and availability APIs.
//!
//! ## Structure
//! - **Agencies**
//!   - `GET    /api/agencies`       : list, boats populated
//!   - `POST   /api/agencies`       : create
//!   - `GET    /api/agencies/{id}`  : fetch, boats populated
//!   - `PUT    /api/agencies/{id}`  : partial update
//!   - `DELETE /api/agencies/{id}`  : delete with boats and their calendars
//!
//! - **Boats**
//!   - `GET    /api/boats`          : list
//!   - `POST   /api/boats`          : create and generate 30 days of availability
//!   - `GET    /api/boats/{id}`     : fetch
//!   - `PUT    /api/boats/{id}`     : partial update
//!   - `DELETE /api/boats/{id}`     : delete with calendar
//!
//! - **Availability**
//!   - `GET    /api/availabilities`                : list
//!   - `POST   /api/availabilities`                : create
//!   - `GET    /api/availabilities/{id}`           : fetch
//!   - `PUT    /api/availabilities/{id}`           : partial update
//!   - `DELETE /api/availabilities/{id}`           : delete
//!   - `GET    /api/availabilities/boat/{boat_id}` : a boat's calendar
//!   - `DELETE /api/availabilities/boat/{boat_id}` : clear a boat's calendar

use crate::{
    handlers::{
        agency_handlers::{create_agency, delete_agency, get_agency, list_agencies, update_agency},
        availability_handlers::{
            create_availability, delete_availabilities_for_boat, delete_availability,
            get_availability, list_availabilities, list_availabilities_for_boat,
            update_availability,
        },
        boat_handlers::{create_boat, delete_boat, get_boat, list_boats, update_boat},
        health_handlers::{healthz, readyz},
    },
    services::inventory_service::InventoryService,
};
use axum::{Router, routing::get};

/// Build and return the router for all inventory routes.
///
/// The router carries shared state (`InventoryService`) to all handlers.
pub fn routes() -> Router<InventoryService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Agencies
        .route("/api/agencies", get(list_agencies).post(create_agency))
        .route(
            "/api/agencies/{id}",
            get(get_agency).put(update_agency).delete(delete_agency),
        )
        // Boats
        .route("/api/boats", get(list_boats).post(create_boat))
        .route(
            "/api/boats/{id}",
            get(get_boat).put(update_boat).delete(delete_boat),
        )
        // Availability
        .route(
            "/api/availabilities",
            get(list_availabilities).post(create_availability),
        )
        .route(
            "/api/availabilities/boat/{boat_id}",
            get(list_availabilities_for_boat).delete(delete_availabilities_for_boat),
        )
        .route(
            "/api/availabilities/{id}",
            get(get_availability)
                .put(update_availability)
                .delete(delete_availability),
        )
}
