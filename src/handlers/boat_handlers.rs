//! HTTP handlers for `/api/boats`.

use super::json_body;
use crate::{
    errors::AppError,
    models::boat::Boat,
    services::inventory_service::InventoryService,
    validation::{self, parse_id},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

/// GET `/api/boats`
pub async fn list_boats(
    State(service): State<InventoryService>,
) -> Result<Json<Vec<Boat>>, AppError> {
    Ok(Json(service.list_boats().await?))
}

/// GET `/api/boats/{id}`
pub async fn get_boat(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Json<Boat>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_boat(id).await?))
}

/// POST `/api/boats`: the response carries the 30 generated
/// `availabilityIds`.
pub async fn create_boat(
    State(service): State<InventoryService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Boat>), AppError> {
    let input = validation::new_boat(&json_body(payload)?)?;
    let boat = service.create_boat(input).await?;
    Ok((StatusCode::CREATED, Json(boat)))
}

/// PUT `/api/boats/{id}`
pub async fn update_boat(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Boat>, AppError> {
    let id = parse_id(&id)?;
    let patch = validation::boat_patch(&json_body(payload)?)?;
    Ok(Json(service.update_boat(id, patch).await?))
}

/// DELETE `/api/boats/{id}`
pub async fn delete_boat(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    service.delete_boat(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
