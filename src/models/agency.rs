//! Represents an agency, the tenant that owns a fleet of boats.

use super::boat::Boat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// An agency record.
///
/// `boat_ids` is the ordered list of boats created under this agency and
/// still active. It is maintained by `services::integrity`, never by API
/// payloads.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: Uuid,

    /// Display name, 2 to 25 characters.
    pub name: String,

    /// Exactly ten ASCII digits. Unique among active agencies.
    pub phone: String,

    pub boat_ids: Json<Vec<Uuid>>,

    #[serde(skip)]
    pub version: i64,

    #[serde(skip)]
    pub is_deleted: bool,

    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// An agency with its boats resolved from `boat_ids`, in list order.
#[derive(Serialize, Clone, Debug)]
pub struct AgencyWithBoats {
    #[serde(flatten)]
    pub agency: Agency,
    pub boats: Vec<Boat>,
}

/// Validated input for creating an agency.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAgency {
    pub name: String,
    pub phone: String,
}

/// Validated partial update. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgencyPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
}
