//! Represents one calendar day of pricing and availability for a boat.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An availability record.
///
/// `date` always sits at 00:00:00.000 UTC. `boat_id` is fixed at creation.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: Uuid,

    #[serde(serialize_with = "super::serialize_day")]
    pub date: DateTime<Utc>,

    pub is_available: bool,

    pub base_rate: f64,
    pub adult_rate: f64,
    pub child_rate: f64,
    pub infant_rate: f64,

    pub boat_id: Uuid,

    #[serde(skip)]
    pub version: i64,

    #[serde(skip)]
    pub is_deleted: bool,

    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated input for creating an availability row. Also produced in bulk
/// by the calendar generator.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAvailability {
    pub date: DateTime<Utc>,
    pub is_available: bool,
    pub base_rate: f64,
    pub adult_rate: f64,
    pub child_rate: f64,
    pub infant_rate: f64,
    pub boat_id: Uuid,
}

/// Validated partial update. `date` and `boat_id` are not updatable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvailabilityPatch {
    pub is_available: Option<bool>,
    pub base_rate: Option<f64>,
    pub adult_rate: Option<f64>,
    pub child_rate: Option<f64>,
    pub infant_rate: Option<f64>,
}
