//! HTTP handlers. Each one parses path ids and bodies, runs validation, and
//! delegates to `InventoryService`.

pub mod agency_handlers;
pub mod availability_handlers;
pub mod boat_handlers;
pub mod health_handlers;

use crate::errors::AppError;
use axum::{Json, extract::rejection::JsonRejection};
use serde_json::Value;

/// Unwrap a JSON body, turning axum's rejection into a 400.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(body) = payload?;
    Ok(body)
}

/// Fallback for unmatched routes.
pub async fn unknown_endpoint() -> AppError {
    AppError::not_found("unknown endpoint")
}
