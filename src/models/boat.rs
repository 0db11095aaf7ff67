//! Represents a boat, the rentable unit owned by an agency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Boat category. Stored and serialized in lowercase.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BoatType {
    Deluxe,
    Premium,
    Luxury,
}

impl BoatType {
    pub const ALL: [BoatType; 3] = [BoatType::Deluxe, BoatType::Premium, BoatType::Luxury];

    pub fn as_str(self) -> &'static str {
        match self {
            BoatType::Deluxe => "deluxe",
            BoatType::Premium => "premium",
            BoatType::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BoatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoatType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoatType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or(())
    }
}

/// A boat record.
///
/// `agency_id` is fixed at creation. `availability_ids` lists the boat's
/// active calendar rows in creation order and is maintained by
/// `services::integrity`.
#[derive(Serialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Boat {
    pub id: Uuid,

    /// Between 0 and 10 inclusive.
    pub number_of_bedrooms: i64,

    pub boat_type: BoatType,

    /// Strictly positive.
    pub min_adults_required: i64,

    pub default_base_rate: f64,
    pub default_adult_rate: f64,
    pub default_child_rate: f64,
    pub default_infant_rate: f64,

    pub agency_id: Uuid,

    pub availability_ids: Json<Vec<Uuid>>,

    #[serde(skip)]
    pub version: i64,

    #[serde(skip)]
    pub is_deleted: bool,

    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated input for creating a boat.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBoat {
    pub number_of_bedrooms: i64,
    pub boat_type: BoatType,
    pub min_adults_required: i64,
    pub default_base_rate: f64,
    pub default_adult_rate: f64,
    pub default_child_rate: f64,
    pub default_infant_rate: f64,
    pub agency_id: Uuid,
}

/// Validated partial update. `agency_id` and `availability_ids` are not
/// updatable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoatPatch {
    pub number_of_bedrooms: Option<i64>,
    pub boat_type: Option<BoatType>,
    pub min_adults_required: Option<i64>,
    pub default_base_rate: Option<f64>,
    pub default_adult_rate: Option<f64>,
    pub default_child_rate: Option<f64>,
    pub default_infant_rate: Option<f64>,
}
