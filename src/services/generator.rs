//! Default calendar for new boats.
//!
//! A new boat gets one availability row per day for the next
//! [`GENERATED_DAYS`] days, starting the day after creation, priced from the
//! boat's default rates.

use crate::{
    models::{availability::NewAvailability, boat::Boat, midnight},
    services::integrity::{self, ChildList},
};
use chrono::{Days, NaiveDate};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{info, warn};
use uuid::Uuid;

pub const GENERATED_DAYS: u64 = 30;

/// Build the rows for `boat`, for the days `today + 1 ..= today + 30`.
pub fn default_calendar(boat: &Boat, today: NaiveDate) -> Vec<NewAvailability> {
    (1..=GENERATED_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|day| NewAvailability {
            date: midnight(day),
            is_available: true,
            base_rate: boat.default_base_rate,
            adult_rate: boat.default_adult_rate,
            child_rate: boat.default_child_rate,
            infant_rate: boat.default_infant_rate,
            boat_id: boat.id,
        })
        .collect()
}

/// Insert all `rows` with one multi-row statement and return the ids that
/// were written.
pub async fn insert_many(
    conn: &mut SqliteConnection,
    rows: &[NewAvailability],
) -> sqlx::Result<Vec<Uuid>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "INSERT INTO availabilities \
         (id, date, is_available, base_rate, adult_rate, child_rate, infant_rate, boat_id) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(Uuid::new_v4())
            .push_bind(row.date)
            .push_bind(row.is_available)
            .push_bind(row.base_rate)
            .push_bind(row.adult_rate)
            .push_bind(row.child_rate)
            .push_bind(row.infant_rate)
            .push_bind(row.boat_id);
    });
    builder.push(" RETURNING id");

    builder
        .build_query_scalar::<Uuid>()
        .fetch_all(&mut *conn)
        .await
}

/// Generate, insert and link the default calendar of a freshly inserted
/// boat. A short insert is logged and the ids that did land are linked.
pub async fn generate_for_boat(
    conn: &mut SqliteConnection,
    boat: &Boat,
    today: NaiveDate,
) -> sqlx::Result<Vec<Uuid>> {
    let rows = default_calendar(boat, today);
    let ids = insert_many(conn, &rows).await?;

    if ids.len() < rows.len() {
        warn!(
            boat_id = %boat.id,
            requested = rows.len(),
            inserted = ids.len(),
            "default availability insert came back short"
        );
    }

    integrity::reset_children(conn, ChildList::BoatAvailabilities, boat.id, &ids).await?;
    info!(boat_id = %boat.id, days = ids.len(), "generated default availability");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::boat::BoatType;
    use chrono::{DateTime, Timelike, Utc};
    use sqlx::types::Json;
    use std::collections::HashSet;

    fn boat() -> Boat {
        Boat {
            id: Uuid::new_v4(),
            number_of_bedrooms: 2,
            boat_type: BoatType::Luxury,
            min_adults_required: 2,
            default_base_rate: 9000.0,
            default_adult_rate: 1500.0,
            default_child_rate: 750.0,
            default_infant_rate: 0.0,
            agency_id: Uuid::new_v4(),
            availability_ids: Json(Vec::new()),
            version: 0,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn calendar_covers_next_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let boat = boat();
        let rows = default_calendar(&boat, today);

        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].date.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 16).unwrap());
        assert_eq!(rows[29].date.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());

        let days: HashSet<NaiveDate> = rows.iter().map(|r| r.date.date_naive()).collect();
        assert_eq!(days.len(), 30);

        for row in &rows {
            assert!(row.is_available);
            assert_eq!(row.boat_id, boat.id);
            assert_eq!(row.base_rate, 9000.0);
            assert_eq!(row.adult_rate, 1500.0);
            assert_eq!(row.child_rate, 750.0);
            assert_eq!(row.infant_rate, 0.0);
            assert_eq!(row.date.num_seconds_from_midnight(), 0);
            assert_eq!(row.date.nanosecond(), 0);
        }
    }

    #[tokio::test]
    async fn bulk_insert_returns_every_id() {
        let pool = crate::db::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let boat = boat();
        let rows = default_calendar(&boat, NaiveDate::from_ymd_opt(2024, 12, 20).unwrap());

        let ids = insert_many(&mut conn, &rows).await.unwrap();
        assert_eq!(ids.len(), 30);

        let stored: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT date FROM availabilities WHERE boat_id = ? ORDER BY date")
                .bind(boat.id)
                .fetch_all(&mut *conn)
                .await
                .unwrap();
        assert_eq!(stored.len(), 30);
        assert_eq!(stored[0].date_naive(), NaiveDate::from_ymd_opt(2024, 12, 21).unwrap());
        assert_eq!(stored[29].date_naive(), NaiveDate::from_ymd_opt(2025, 1, 19).unwrap());
    }

    #[tokio::test]
    async fn empty_insert_is_a_no_op() {
        let pool = crate::db::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(insert_many(&mut conn, &[]).await.unwrap().is_empty());
    }
}
