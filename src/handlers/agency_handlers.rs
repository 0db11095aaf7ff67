//! HTTP handlers for `/api/agencies`.

use super::json_body;
use crate::{
    errors::AppError,
    models::agency::{Agency, AgencyWithBoats},
    services::inventory_service::InventoryService,
    validation::{self, parse_id},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

/// GET `/api/agencies`: active agencies with their boats.
pub async fn list_agencies(
    State(service): State<InventoryService>,
) -> Result<Json<Vec<AgencyWithBoats>>, AppError> {
    Ok(Json(service.list_agencies().await?))
}

/// GET `/api/agencies/{id}`
pub async fn get_agency(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Json<AgencyWithBoats>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_agency(id).await?))
}

/// POST `/api/agencies`
pub async fn create_agency(
    State(service): State<InventoryService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Agency>), AppError> {
    let input = validation::new_agency(&json_body(payload)?)?;
    let agency = service.create_agency(input).await?;
    Ok((StatusCode::CREATED, Json(agency)))
}

/// PUT `/api/agencies/{id}`: partial update of name and phone.
pub async fn update_agency(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Agency>, AppError> {
    let id = parse_id(&id)?;
    let patch = validation::agency_patch(&json_body(payload)?)?;
    Ok(Json(service.update_agency(id, patch).await?))
}

/// DELETE `/api/agencies/{id}`: cascades to the agency's boats.
pub async fn delete_agency(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    service.delete_agency(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
