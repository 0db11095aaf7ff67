//! src/services/inventory_service.rs
//!
//! InventoryService: agency, boat and availability operations backed by
//! SQLite. Reads only ever see active rows. Every mutation that touches more
//! than one row runs in a single transaction, so a failed step rolls back
//! the parent change together with its cascade.

use crate::{
    models::{
        agency::{Agency, AgencyPatch, AgencyWithBoats, NewAgency},
        availability::{Availability, AvailabilityPatch, NewAvailability},
        boat::{Boat, BoatPatch, NewBoat},
    },
    services::{
        cascade::{self, CascadeReport, DeletePolicy},
        generator,
        integrity::{self, ChildList},
    },
};
use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const AGENCY_COLUMNS: &str = "id, name, phone, boat_ids, version, is_deleted, deleted_at";

const BOAT_COLUMNS: &str = "id, number_of_bedrooms, boat_type, min_adults_required, \
     default_base_rate, default_adult_rate, default_child_rate, default_infant_rate, \
     agency_id, availability_ids, version, is_deleted, deleted_at";

const AVAILABILITY_COLUMNS: &str = "id, date, is_available, base_rate, adult_rate, child_rate, \
     infant_rate, boat_id, version, is_deleted, deleted_at";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Agency not found")]
    AgencyNotFound,
    #[error("Boat not found")]
    BoatNotFound,
    #[error("Availability not found")]
    AvailabilityNotFound,
    #[error("Phone number already in use")]
    PhoneInUse,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// InventoryService owns the consistency rules between the three entities:
/// - Creating a boat links it into its agency and generates its calendar
/// - Creating an availability links it into its boat
/// - Deleting anything cascades downwards and unlinks it from its parent
#[derive(Clone)]
pub struct InventoryService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    /// Soft or hard deletes, applied to all three entities.
    pub delete_policy: DeletePolicy,
}

impl InventoryService {
    pub fn new(db: Arc<SqlitePool>, delete_policy: DeletePolicy) -> Self {
        Self { db, delete_policy }
    }

    /// Open a transaction that takes the write lock up front. Concurrent
    /// writers queue on the busy timeout rather than failing a lock upgrade
    /// halfway through.
    async fn begin_write(&self) -> sqlx::Result<Transaction<'static, Sqlite>> {
        self.db.begin_with("BEGIN IMMEDIATE").await
    }

    // ---------------------------------------------------------------------
    // Agencies
    // ---------------------------------------------------------------------

    /// All active agencies with their boats resolved.
    pub async fn list_agencies(&self) -> InventoryResult<Vec<AgencyWithBoats>> {
        let agencies: Vec<Agency> = sqlx::query_as(&format!(
            "SELECT {AGENCY_COLUMNS} FROM agencies WHERE is_deleted = 0 ORDER BY rowid"
        ))
        .fetch_all(&*self.db)
        .await?;

        let boats: Vec<Boat> = sqlx::query_as(&format!(
            "SELECT {BOAT_COLUMNS} FROM boats WHERE is_deleted = 0"
        ))
        .fetch_all(&*self.db)
        .await?;
        let mut by_id: HashMap<Uuid, Boat> = boats.into_iter().map(|b| (b.id, b)).collect();

        Ok(agencies
            .into_iter()
            .map(|agency| {
                let boats = agency
                    .boat_ids
                    .iter()
                    .filter_map(|id| by_id.remove(id))
                    .collect();
                AgencyWithBoats { agency, boats }
            })
            .collect())
    }

    pub async fn get_agency(&self, id: Uuid) -> InventoryResult<AgencyWithBoats> {
        let mut conn = self.db.acquire().await?;
        let agency = fetch_agency(&mut conn, id).await?;
        let boats = resolve_boats(&mut conn, &agency).await?;
        Ok(AgencyWithBoats { agency, boats })
    }

    /// Insert an agency with an empty boat list.
    pub async fn create_agency(&self, input: NewAgency) -> InventoryResult<Agency> {
        let mut conn = self.db.acquire().await?;
        ensure_phone_free(&mut conn, &input.phone, None).await?;

        let agency: Agency = sqlx::query_as(&format!(
            "INSERT INTO agencies (id, name, phone, boat_ids) VALUES (?, ?, ?, '[]')
             RETURNING {AGENCY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.phone)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_phone_conflict)?;

        info!(agency_id = %agency.id, name = %agency.name, "created agency");
        Ok(agency)
    }

    pub async fn update_agency(&self, id: Uuid, patch: AgencyPatch) -> InventoryResult<Agency> {
        let mut tx = self.begin_write().await?;
        let current = fetch_agency(&mut tx, id).await?;
        if let Some(phone) = &patch.phone {
            ensure_phone_free(&mut tx, phone, Some(id)).await?;
        }

        let agency: Agency = sqlx::query_as(&format!(
            "UPDATE agencies SET name = ?, phone = ?, version = version + 1
             WHERE id = ? AND is_deleted = 0
             RETURNING {AGENCY_COLUMNS}"
        ))
        .bind(patch.name.unwrap_or(current.name))
        .bind(patch.phone.unwrap_or(current.phone))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_phone_conflict)?;

        tx.commit().await?;
        debug!(agency_id = %id, version = agency.version, "updated agency");
        Ok(agency)
    }

    /// Delete an agency together with its boats and their calendars.
    pub async fn delete_agency(&self, id: Uuid) -> InventoryResult<CascadeReport> {
        let mut tx = self.begin_write().await?;
        let agency = fetch_agency(&mut tx, id).await?;
        let report = cascade::delete_agency(&mut tx, self.delete_policy, &agency).await?;
        tx.commit().await?;
        Ok(report)
    }

    // ---------------------------------------------------------------------
    // Boats
    // ---------------------------------------------------------------------

    pub async fn list_boats(&self) -> InventoryResult<Vec<Boat>> {
        Ok(sqlx::query_as(&format!(
            "SELECT {BOAT_COLUMNS} FROM boats WHERE is_deleted = 0 ORDER BY rowid"
        ))
        .fetch_all(&*self.db)
        .await?)
    }

    pub async fn get_boat(&self, id: Uuid) -> InventoryResult<Boat> {
        let mut conn = self.db.acquire().await?;
        fetch_boat(&mut conn, id).await
    }

    /// Insert a boat under an active agency, link it into the agency and
    /// generate its default calendar.
    pub async fn create_boat(&self, input: NewBoat) -> InventoryResult<Boat> {
        let mut tx = self.begin_write().await?;
        let agency = fetch_agency(&mut tx, input.agency_id).await?;

        let boat: Boat = sqlx::query_as(&format!(
            "INSERT INTO boats (
                 id, number_of_bedrooms, boat_type, min_adults_required,
                 default_base_rate, default_adult_rate, default_child_rate, default_infant_rate,
                 agency_id, availability_ids
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '[]')
             RETURNING {BOAT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.number_of_bedrooms)
        .bind(input.boat_type)
        .bind(input.min_adults_required)
        .bind(input.default_base_rate)
        .bind(input.default_adult_rate)
        .bind(input.default_child_rate)
        .bind(input.default_infant_rate)
        .bind(agency.id)
        .fetch_one(&mut *tx)
        .await?;

        integrity::link_child(&mut tx, ChildList::AgencyBoats, agency.id, boat.id).await?;
        generator::generate_for_boat(&mut tx, &boat, Utc::now().date_naive()).await?;

        let boat = fetch_boat(&mut tx, boat.id).await?;
        tx.commit().await?;

        info!(boat_id = %boat.id, agency_id = %agency.id, boat_type = %boat.boat_type, "created boat");
        Ok(boat)
    }

    pub async fn update_boat(&self, id: Uuid, patch: BoatPatch) -> InventoryResult<Boat> {
        let mut tx = self.begin_write().await?;
        let current = fetch_boat(&mut tx, id).await?;

        let boat: Boat = sqlx::query_as(&format!(
            "UPDATE boats SET
                 number_of_bedrooms = ?, boat_type = ?, min_adults_required = ?,
                 default_base_rate = ?, default_adult_rate = ?, default_child_rate = ?,
                 default_infant_rate = ?, version = version + 1
             WHERE id = ? AND is_deleted = 0
             RETURNING {BOAT_COLUMNS}"
        ))
        .bind(patch.number_of_bedrooms.unwrap_or(current.number_of_bedrooms))
        .bind(patch.boat_type.unwrap_or(current.boat_type))
        .bind(patch.min_adults_required.unwrap_or(current.min_adults_required))
        .bind(patch.default_base_rate.unwrap_or(current.default_base_rate))
        .bind(patch.default_adult_rate.unwrap_or(current.default_adult_rate))
        .bind(patch.default_child_rate.unwrap_or(current.default_child_rate))
        .bind(patch.default_infant_rate.unwrap_or(current.default_infant_rate))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(boat_id = %id, version = boat.version, "updated boat");
        Ok(boat)
    }

    /// Delete a boat and its calendar, and drop it from its agency.
    pub async fn delete_boat(&self, id: Uuid) -> InventoryResult<CascadeReport> {
        let mut tx = self.begin_write().await?;
        let boat = fetch_boat(&mut tx, id).await?;
        let report = cascade::delete_boat(&mut tx, self.delete_policy, &boat).await?;
        tx.commit().await?;
        Ok(report)
    }

    // ---------------------------------------------------------------------
    // Availability
    // ---------------------------------------------------------------------

    pub async fn list_availabilities(&self) -> InventoryResult<Vec<Availability>> {
        Ok(sqlx::query_as(&format!(
            "SELECT {AVAILABILITY_COLUMNS} FROM availabilities
             WHERE is_deleted = 0 ORDER BY rowid"
        ))
        .fetch_all(&*self.db)
        .await?)
    }

    pub async fn get_availability(&self, id: Uuid) -> InventoryResult<Availability> {
        let mut conn = self.db.acquire().await?;
        fetch_availability(&mut conn, id).await
    }

    /// Calendar of an active boat, ordered by date.
    pub async fn list_availabilities_for_boat(
        &self,
        boat_id: Uuid,
    ) -> InventoryResult<Vec<Availability>> {
        let mut conn = self.db.acquire().await?;
        fetch_boat(&mut conn, boat_id).await?;

        Ok(sqlx::query_as(&format!(
            "SELECT {AVAILABILITY_COLUMNS} FROM availabilities
             WHERE boat_id = ? AND is_deleted = 0 ORDER BY date, rowid"
        ))
        .bind(boat_id)
        .fetch_all(&mut *conn)
        .await?)
    }

    /// Insert one availability row under an active boat and link it.
    pub async fn create_availability(
        &self,
        input: NewAvailability,
    ) -> InventoryResult<Availability> {
        let mut tx = self.begin_write().await?;
        let boat = fetch_boat(&mut tx, input.boat_id).await?;

        let availability: Availability = sqlx::query_as(&format!(
            "INSERT INTO availabilities (
                 id, date, is_available, base_rate, adult_rate, child_rate, infant_rate, boat_id
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {AVAILABILITY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.date)
        .bind(input.is_available)
        .bind(input.base_rate)
        .bind(input.adult_rate)
        .bind(input.child_rate)
        .bind(input.infant_rate)
        .bind(boat.id)
        .fetch_one(&mut *tx)
        .await?;

        integrity::link_child(
            &mut tx,
            ChildList::BoatAvailabilities,
            boat.id,
            availability.id,
        )
        .await?;
        tx.commit().await?;

        debug!(availability_id = %availability.id, boat_id = %boat.id, "created availability");
        Ok(availability)
    }

    pub async fn update_availability(
        &self,
        id: Uuid,
        patch: AvailabilityPatch,
    ) -> InventoryResult<Availability> {
        let mut tx = self.begin_write().await?;
        let current = fetch_availability(&mut tx, id).await?;

        let availability: Availability = sqlx::query_as(&format!(
            "UPDATE availabilities SET
                 is_available = ?, base_rate = ?, adult_rate = ?, child_rate = ?,
                 infant_rate = ?, version = version + 1
             WHERE id = ? AND is_deleted = 0
             RETURNING {AVAILABILITY_COLUMNS}"
        ))
        .bind(patch.is_available.unwrap_or(current.is_available))
        .bind(patch.base_rate.unwrap_or(current.base_rate))
        .bind(patch.adult_rate.unwrap_or(current.adult_rate))
        .bind(patch.child_rate.unwrap_or(current.child_rate))
        .bind(patch.infant_rate.unwrap_or(current.infant_rate))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(availability)
    }

    /// Delete one availability row and drop it from its boat.
    pub async fn delete_availability(&self, id: Uuid) -> InventoryResult<CascadeReport> {
        let mut tx = self.begin_write().await?;
        let availability = fetch_availability(&mut tx, id).await?;
        let report =
            cascade::delete_availability(&mut tx, self.delete_policy, &availability).await?;
        tx.commit().await?;
        Ok(report)
    }

    /// Delete the whole calendar of an active boat.
    pub async fn delete_availabilities_for_boat(
        &self,
        boat_id: Uuid,
    ) -> InventoryResult<CascadeReport> {
        let mut tx = self.begin_write().await?;
        fetch_boat(&mut tx, boat_id).await?;
        let report = cascade::clear_boat_availability(&mut tx, self.delete_policy, boat_id).await?;
        tx.commit().await?;
        Ok(report)
    }
}

/// Fetch an active agency.
async fn fetch_agency(conn: &mut SqliteConnection, id: Uuid) -> InventoryResult<Agency> {
    sqlx::query_as(&format!(
        "SELECT {AGENCY_COLUMNS} FROM agencies WHERE id = ? AND is_deleted = 0"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(InventoryError::AgencyNotFound)
}

/// Fetch an active boat.
async fn fetch_boat(conn: &mut SqliteConnection, id: Uuid) -> InventoryResult<Boat> {
    sqlx::query_as(&format!(
        "SELECT {BOAT_COLUMNS} FROM boats WHERE id = ? AND is_deleted = 0"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(InventoryError::BoatNotFound)
}

/// Fetch an active availability row.
async fn fetch_availability(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> InventoryResult<Availability> {
    sqlx::query_as(&format!(
        "SELECT {AVAILABILITY_COLUMNS} FROM availabilities WHERE id = ? AND is_deleted = 0"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(InventoryError::AvailabilityNotFound)
}

/// Active boats of `agency`, in `boat_ids` order.
async fn resolve_boats(conn: &mut SqliteConnection, agency: &Agency) -> InventoryResult<Vec<Boat>> {
    let boats: Vec<Boat> = sqlx::query_as(&format!(
        "SELECT {BOAT_COLUMNS} FROM boats WHERE agency_id = ? AND is_deleted = 0"
    ))
    .bind(agency.id)
    .fetch_all(&mut *conn)
    .await?;
    let mut by_id: HashMap<Uuid, Boat> = boats.into_iter().map(|b| (b.id, b)).collect();

    Ok(agency
        .boat_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect())
}

/// Reject `phone` if another active agency already uses it.
async fn ensure_phone_free(
    conn: &mut SqliteConnection,
    phone: &str,
    except: Option<Uuid>,
) -> InventoryResult<()> {
    let owner: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM agencies WHERE phone = ? AND is_deleted = 0")
            .bind(phone)
            .fetch_optional(&mut *conn)
            .await?;

    match owner {
        Some(owner) if Some(owner) != except => Err(InventoryError::PhoneInUse),
        _ => Ok(()),
    }
}

/// The partial unique index on `agencies.phone` backs up `ensure_phone_free`.
fn map_phone_conflict(err: sqlx::Error) -> InventoryError {
    if is_unique_violation(&err) {
        InventoryError::PhoneInUse
    } else {
        InventoryError::Sqlx(err)
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
