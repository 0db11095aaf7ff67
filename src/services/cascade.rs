//! Cascading deletes.
//!
//! Every entity moves from active to deleted exactly once. With
//! [`DeletePolicy::Soft`] the row stays and gets `is_deleted = 1` plus a
//! `deleted_at` timestamp; with [`DeletePolicy::Hard`] the row is removed.
//! Both policies only ever touch rows that are still active.
//!
//! The parent is retired first, then its children in the order its id list
//! holds them. A child step that finds nothing to retire is logged and the
//! cascade moves on. Callers run these functions inside one transaction.

use crate::{
    models::{agency::Agency, availability::Availability, boat::Boat},
    services::integrity::{self, ChildList},
};
use chrono::Utc;
use clap::ValueEnum;
use sqlx::SqliteConnection;
use tracing::{info, warn};
use uuid::Uuid;

/// How deleted entities are represented in storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DeletePolicy {
    /// Flag the row and stamp `deleted_at`.
    #[default]
    Soft,
    /// Remove the row.
    Hard,
}

/// Row counts touched by one cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub agencies: u64,
    pub boats: u64,
    pub availabilities: u64,
}

#[derive(Clone, Copy)]
enum Table {
    Agencies,
    Boats,
    Availabilities,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Agencies => "agencies",
            Table::Boats => "boats",
            Table::Availabilities => "availabilities",
        }
    }
}

/// Retire every active row of `table` whose `key_column` equals `key`.
async fn retire(
    conn: &mut SqliteConnection,
    policy: DeletePolicy,
    table: Table,
    key_column: &str,
    key: Uuid,
) -> sqlx::Result<u64> {
    let table = table.name();
    let result = match policy {
        DeletePolicy::Soft => {
            let sql = format!(
                "UPDATE {table} SET is_deleted = 1, deleted_at = ?, version = version + 1
                 WHERE {key_column} = ? AND is_deleted = 0"
            );
            sqlx::query(&sql)
                .bind(Utc::now())
                .bind(key)
                .execute(&mut *conn)
                .await?
        }
        DeletePolicy::Hard => {
            let sql = format!("DELETE FROM {table} WHERE {key_column} = ? AND is_deleted = 0");
            sqlx::query(&sql).bind(key).execute(&mut *conn).await?
        }
    };
    Ok(result.rows_affected())
}

/// Retire an agency, each boat in its `boat_ids`, and each of those boats'
/// availability rows.
pub async fn delete_agency(
    conn: &mut SqliteConnection,
    policy: DeletePolicy,
    agency: &Agency,
) -> sqlx::Result<CascadeReport> {
    let mut report = CascadeReport {
        agencies: retire(conn, policy, Table::Agencies, "id", agency.id).await?,
        ..Default::default()
    };

    for &boat_id in agency.boat_ids.iter() {
        let boats = retire(conn, policy, Table::Boats, "id", boat_id).await?;
        if boats == 0 {
            warn!(agency_id = %agency.id, %boat_id, "boat already gone while deleting agency");
        }
        report.boats += boats;

        let availabilities =
            retire(conn, policy, Table::Availabilities, "boat_id", boat_id).await?;
        if availabilities == 0 {
            warn!(agency_id = %agency.id, %boat_id, "no availability to delete for boat of deleted agency");
        }
        report.availabilities += availabilities;
    }

    info!(agency_id = %agency.id, ?policy, ?report, "deleted agency");
    Ok(report)
}

/// Retire a boat, drop it from its agency's list, and retire its
/// availability rows.
pub async fn delete_boat(
    conn: &mut SqliteConnection,
    policy: DeletePolicy,
    boat: &Boat,
) -> sqlx::Result<CascadeReport> {
    let boats = retire(conn, policy, Table::Boats, "id", boat.id).await?;
    integrity::unlink_child(conn, ChildList::AgencyBoats, boat.agency_id, boat.id).await?;
    let availabilities = retire(conn, policy, Table::Availabilities, "boat_id", boat.id).await?;

    let report = CascadeReport {
        boats,
        availabilities,
        ..Default::default()
    };
    info!(boat_id = %boat.id, agency_id = %boat.agency_id, ?policy, ?report, "deleted boat");
    Ok(report)
}

/// Retire one availability row and drop it from its boat's list.
pub async fn delete_availability(
    conn: &mut SqliteConnection,
    policy: DeletePolicy,
    availability: &Availability,
) -> sqlx::Result<CascadeReport> {
    let availabilities =
        retire(conn, policy, Table::Availabilities, "id", availability.id).await?;
    integrity::unlink_child(
        conn,
        ChildList::BoatAvailabilities,
        availability.boat_id,
        availability.id,
    )
    .await?;

    Ok(CascadeReport {
        availabilities,
        ..Default::default()
    })
}

/// Retire every availability row of a boat and empty its list.
pub async fn clear_boat_availability(
    conn: &mut SqliteConnection,
    policy: DeletePolicy,
    boat_id: Uuid,
) -> sqlx::Result<CascadeReport> {
    let availabilities = retire(conn, policy, Table::Availabilities, "boat_id", boat_id).await?;
    integrity::reset_children(conn, ChildList::BoatAvailabilities, boat_id, &[]).await?;

    info!(%boat_id, ?policy, availabilities, "cleared boat availability");
    Ok(CascadeReport {
        availabilities,
        ..Default::default()
    })
}
