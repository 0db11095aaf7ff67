//! Core data models for the boat inventory service.
//!
//! Rows map to SQLite tables via `sqlx::FromRow` and serialize as the JSON
//! documents returned by the API. Bookkeeping columns (`version`,
//! `is_deleted`, `deleted_at`) are read from the database but never
//! serialized.

pub mod agency;
pub mod availability;
pub mod boat;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::Serializer;

/// Truncate an instant to 00:00:00.000 UTC of the same calendar day.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    midnight(instant.date_naive())
}

/// Midnight UTC of `day`.
pub fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Serialize a day as `YYYY-MM-DDT00:00:00.000Z`.
pub(crate) fn serialize_day<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
