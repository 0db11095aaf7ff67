//! HTTP handlers for `/api/availabilities`.

use super::json_body;
use crate::{
    errors::AppError,
    models::availability::Availability,
    services::inventory_service::InventoryService,
    validation::{self, parse_id},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

/// GET `/api/availabilities`
pub async fn list_availabilities(
    State(service): State<InventoryService>,
) -> Result<Json<Vec<Availability>>, AppError> {
    Ok(Json(service.list_availabilities().await?))
}

/// GET `/api/availabilities/{id}`
pub async fn get_availability(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Json<Availability>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_availability(id).await?))
}

/// GET `/api/availabilities/boat/{boat_id}`: the boat's calendar by date.
pub async fn list_availabilities_for_boat(
    State(service): State<InventoryService>,
    Path(boat_id): Path<String>,
) -> Result<Json<Vec<Availability>>, AppError> {
    let boat_id = parse_id(&boat_id)?;
    Ok(Json(service.list_availabilities_for_boat(boat_id).await?))
}

/// POST `/api/availabilities`
pub async fn create_availability(
    State(service): State<InventoryService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Availability>), AppError> {
    let input = validation::new_availability(&json_body(payload)?)?;
    let availability = service.create_availability(input).await?;
    Ok((StatusCode::CREATED, Json(availability)))
}

/// PUT `/api/availabilities/{id}`: `date` and `boatId` are ignored.
pub async fn update_availability(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Availability>, AppError> {
    let id = parse_id(&id)?;
    let patch = validation::availability_patch(&json_body(payload)?)?;
    Ok(Json(service.update_availability(id, patch).await?))
}

/// DELETE `/api/availabilities/{id}`
pub async fn delete_availability(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    service.delete_availability(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/api/availabilities/boat/{boat_id}`
pub async fn delete_availabilities_for_boat(
    State(service): State<InventoryService>,
    Path(boat_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let boat_id = parse_id(&boat_id)?;
    service.delete_availabilities_for_boat(boat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
