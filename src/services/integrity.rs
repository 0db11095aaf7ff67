//! Parent → child id lists.
//!
//! Agencies list their boats in `agencies.boat_ids`; boats list their
//! calendar rows in `boats.availability_ids`. Both columns are JSON arrays of
//! hyphenated UUID strings. Every edit is a single `UPDATE` that rewrites the
//! array inside SQLite, so concurrent appends to the same parent never
//! overwrite each other. Each edit bumps the parent's `version`.
//!
//! A missing parent row is an integrity warning: it is logged and reported as
//! `false`, never turned into an error.

use sqlx::{SqliteConnection, types::Json};
use tracing::{debug, warn};
use uuid::Uuid;

/// Which parent-side list to edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildList {
    /// `agencies.boat_ids`
    AgencyBoats,
    /// `boats.availability_ids`
    BoatAvailabilities,
}

impl ChildList {
    fn table(self) -> &'static str {
        match self {
            ChildList::AgencyBoats => "agencies",
            ChildList::BoatAvailabilities => "boats",
        }
    }

    fn column(self) -> &'static str {
        match self {
            ChildList::AgencyBoats => "boat_ids",
            ChildList::BoatAvailabilities => "availability_ids",
        }
    }
}

/// Append `child_id` to an active parent's list.
pub async fn link_child(
    conn: &mut SqliteConnection,
    list: ChildList,
    parent_id: Uuid,
    child_id: Uuid,
) -> sqlx::Result<bool> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "UPDATE {table}
         SET {column} = json_insert({column}, '$[#]', ?), version = version + 1
         WHERE id = ? AND is_deleted = 0"
    );
    let result = sqlx::query(&sql)
        .bind(child_id.to_string())
        .bind(parent_id)
        .execute(&mut *conn)
        .await?;

    let linked = result.rows_affected() > 0;
    if linked {
        debug!(%parent_id, %child_id, table, "linked child");
    } else {
        warn!(%parent_id, %child_id, table, "parent missing while linking child");
    }
    Ok(linked)
}

/// Remove every occurrence of `child_id` from the parent's list, keeping the
/// order of the remaining ids.
pub async fn unlink_child(
    conn: &mut SqliteConnection,
    list: ChildList,
    parent_id: Uuid,
    child_id: Uuid,
) -> sqlx::Result<bool> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "UPDATE {table}
         SET {column} = (
                 SELECT json_group_array(value)
                 FROM json_each({table}.{column})
                 WHERE value <> ?
             ),
             version = version + 1
         WHERE id = ?"
    );
    let result = sqlx::query(&sql)
        .bind(child_id.to_string())
        .bind(parent_id)
        .execute(&mut *conn)
        .await?;

    let unlinked = result.rows_affected() > 0;
    if unlinked {
        debug!(%parent_id, %child_id, table, "unlinked child");
    } else {
        warn!(%parent_id, %child_id, table, "parent missing while unlinking child");
    }
    Ok(unlinked)
}

/// Replace the parent's whole list.
pub async fn reset_children(
    conn: &mut SqliteConnection,
    list: ChildList,
    parent_id: Uuid,
    child_ids: &[Uuid],
) -> sqlx::Result<bool> {
    let (table, column) = (list.table(), list.column());
    let sql = format!("UPDATE {table} SET {column} = ?, version = version + 1 WHERE id = ?");
    let result = sqlx::query(&sql)
        .bind(Json(child_ids.to_vec()))
        .bind(parent_id)
        .execute(&mut *conn)
        .await?;

    let reset = result.rows_affected() > 0;
    if !reset {
        warn!(%parent_id, count = child_ids.len(), table, "parent missing while resetting children");
    }
    Ok(reset)
}
