//! Request validation.
//!
//! Pure functions that turn a JSON request body into one of the validated
//! input types in `models`. Nothing here touches the database; existence of
//! referenced parents is checked by the service inside its transaction.
//!
//! A field is *missing* when the key is absent or its value is `null`.
//! `0`, `false` and `""` count as present.

use crate::models::{
    agency::{AgencyPatch, NewAgency},
    availability::{AvailabilityPatch, NewAvailability},
    boat::{BoatPatch, BoatType, NewBoat},
    start_of_day,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

pub const AGENCY_REQUIRED_FIELDS: [&str; 2] = ["name", "phone"];

pub const BOAT_REQUIRED_FIELDS: [&str; 7] = [
    "numberOfBedrooms",
    "boatType",
    "minAdultsRequired",
    "defaultBaseRate",
    "defaultAdultRate",
    "defaultChildRate",
    "agencyId",
];

pub const AVAILABILITY_REQUIRED_FIELDS: [&str; 6] = [
    "date",
    "isAvailable",
    "baseRate",
    "adultRate",
    "childRate",
    "boatId",
];

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 25;
const PHONE_DIGITS: usize = 10;
const MAX_BEDROOMS: i64 = 10;

/// `YYYY-MM-DDTHH:mm:ss.sssZ`, the only accepted date shape.
static ISO_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}Z$")
        .expect("date regex is valid")
});

/// A rejected request. The message is returned to the client verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Read-only view over the top-level object of a request body.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn from_body(body: &'a Value) -> ValidationResult<Self> {
        match body {
            Value::Object(map) => Ok(Self { map }),
            _ => Err(ValidationError::new("Request body must be a JSON object")),
        }
    }

    /// The value for `field`, treating `null` as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Fail on the first missing field, in declaration order.
    pub fn require_all(&self, fields: &[&str]) -> ValidationResult<()> {
        match fields.iter().find(|f| self.get(f).is_none()) {
            Some(field) => Err(ValidationError::new(format!(
                "Missing required field: {field}"
            ))),
            None => Ok(()),
        }
    }

    pub fn string(&self, field: &str) -> ValidationResult<Option<&'a str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ValidationError::new(format!("{field} must be a string"))),
        }
    }

    pub fn number(&self, field: &str) -> ValidationResult<Option<f64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ValidationError::new(format!("{field} must be a number"))),
            Some(_) => Err(ValidationError::new(format!("{field} must be a number"))),
        }
    }

    pub fn integer(&self, field: &str) -> ValidationResult<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return Ok(Some(v));
                }
                // Accept 2.0 but not 2.5.
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Some(f as i64))
                    }
                    _ => Err(ValidationError::new(format!("{field} must be an integer"))),
                }
            }
            Some(_) => Err(ValidationError::new(format!("{field} must be an integer"))),
        }
    }

    pub fn boolean(&self, field: &str) -> ValidationResult<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ValidationError::new(format!("{field} must be a boolean"))),
        }
    }

    /// A rate: finite and not negative.
    pub fn rate(&self, field: &str) -> ValidationResult<Option<f64>> {
        match self.number(field)? {
            Some(v) if v < 0.0 => Err(ValidationError::new(format!(
                "{field} must not be negative"
            ))),
            other => Ok(other),
        }
    }

    /// A reference to another entity. Anything that is not a UUID string is
    /// reported as `Invalid <field>`.
    pub fn reference(&self, field: &str) -> ValidationResult<Option<Uuid>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Uuid::parse_str(s)
                .map(Some)
                .map_err(|_| ValidationError::new(format!("Invalid {field}"))),
            Some(_) => Err(ValidationError::new(format!("Invalid {field}"))),
        }
    }

    fn name(&self) -> ValidationResult<Option<String>> {
        self.string("name")?.map(validate_name).transpose()
    }

    /// Phone numbers may arrive as strings or JSON integers.
    fn phone(&self) -> ValidationResult<Option<String>> {
        let raw = match self.get("phone") {
            None => return Ok(None),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return Err(invalid_phone()),
        };
        normalize_phone(&raw).map(Some)
    }

    fn bedrooms(&self) -> ValidationResult<Option<i64>> {
        self.integer("numberOfBedrooms")?
            .map(validate_bedrooms)
            .transpose()
    }

    fn min_adults(&self) -> ValidationResult<Option<i64>> {
        self.integer("minAdultsRequired")?
            .map(validate_min_adults)
            .transpose()
    }

    fn boat_type(&self) -> ValidationResult<Option<BoatType>> {
        match self.get("boatType") {
            None => Ok(None),
            Some(Value::String(s)) => parse_boat_type(s).map(Some),
            Some(_) => Err(invalid_boat_type()),
        }
    }

    fn is_available(&self) -> ValidationResult<Option<bool>> {
        self.boolean("isAvailable")
            .map_err(|_| ValidationError::new("isAvailable must be a boolean"))
    }

    fn date(&self) -> ValidationResult<Option<DateTime<Utc>>> {
        match self.get("date") {
            None => Ok(None),
            Some(Value::String(s)) => parse_day(s).map(Some),
            Some(_) => Err(invalid_date()),
        }
    }
}

pub fn validate_name(name: &str) -> ValidationResult<String> {
    let chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::new(format!(
            "Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Accept exactly ten ASCII digits.
pub fn normalize_phone(raw: &str) -> ValidationResult<String> {
    if raw.len() != PHONE_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_phone());
    }
    Ok(raw.to_string())
}

pub fn validate_bedrooms(value: i64) -> ValidationResult<i64> {
    if !(0..=MAX_BEDROOMS).contains(&value) {
        return Err(ValidationError::new(
            "Number of bedrooms must be between 0 and 10",
        ));
    }
    Ok(value)
}

pub fn validate_min_adults(value: i64) -> ValidationResult<i64> {
    if value <= 0 {
        return Err(ValidationError::new(
            "Minimum number of adults required must be greater than 0",
        ));
    }
    Ok(value)
}

pub fn parse_boat_type(value: &str) -> ValidationResult<BoatType> {
    value.parse().map_err(|_| invalid_boat_type())
}

/// Check `YYYY-MM-DDTHH:mm:ss.sssZ` and return the calendar day of the
/// instant at midnight UTC.
pub fn parse_day(value: &str) -> ValidationResult<DateTime<Utc>> {
    if !ISO_MILLIS.is_match(value) {
        return Err(invalid_date());
    }
    let instant = DateTime::parse_from_rfc3339(value).map_err(|_| invalid_date())?;
    Ok(start_of_day(instant.with_timezone(&Utc)))
}

/// Path identifiers.
pub fn parse_id(raw: &str) -> ValidationResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::new("Malformatted id"))
}

fn required<T>(field: &str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::new(format!("Missing required field: {field}")))
}

fn invalid_phone() -> ValidationError {
    ValidationError::new("Invalid phone number. Should be a 10-digit number")
}

fn invalid_boat_type() -> ValidationError {
    let allowed = BoatType::ALL.map(BoatType::as_str).join(", ");
    ValidationError::new(format!(
        "Boat type must be one of the following: {allowed}"
    ))
}

fn invalid_date() -> ValidationError {
    ValidationError::new("Invalid date format")
}

pub fn new_agency(body: &Value) -> ValidationResult<NewAgency> {
    let fields = Fields::from_body(body)?;
    fields.require_all(&AGENCY_REQUIRED_FIELDS)?;
    Ok(NewAgency {
        name: required("name", fields.name()?)?,
        phone: required("phone", fields.phone()?)?,
    })
}

/// `boatIds` in the body is ignored; it only changes through boat creation
/// and deletion.
pub fn agency_patch(body: &Value) -> ValidationResult<AgencyPatch> {
    let fields = Fields::from_body(body)?;
    Ok(AgencyPatch {
        name: fields.name()?,
        phone: fields.phone()?,
    })
}

pub fn new_boat(body: &Value) -> ValidationResult<NewBoat> {
    let fields = Fields::from_body(body)?;
    fields.require_all(&BOAT_REQUIRED_FIELDS)?;
    Ok(NewBoat {
        number_of_bedrooms: required("numberOfBedrooms", fields.bedrooms()?)?,
        boat_type: required("boatType", fields.boat_type()?)?,
        min_adults_required: required("minAdultsRequired", fields.min_adults()?)?,
        default_base_rate: required("defaultBaseRate", fields.rate("defaultBaseRate")?)?,
        default_adult_rate: required("defaultAdultRate", fields.rate("defaultAdultRate")?)?,
        default_child_rate: required("defaultChildRate", fields.rate("defaultChildRate")?)?,
        default_infant_rate: fields.rate("defaultInfantRate")?.unwrap_or(0.0),
        agency_id: required("agencyId", fields.reference("agencyId")?)?,
    })
}

/// `agencyId` and `availabilityIds` in the body are ignored.
pub fn boat_patch(body: &Value) -> ValidationResult<BoatPatch> {
    let fields = Fields::from_body(body)?;
    Ok(BoatPatch {
        number_of_bedrooms: fields.bedrooms()?,
        boat_type: fields.boat_type()?,
        min_adults_required: fields.min_adults()?,
        default_base_rate: fields.rate("defaultBaseRate")?,
        default_adult_rate: fields.rate("defaultAdultRate")?,
        default_child_rate: fields.rate("defaultChildRate")?,
        default_infant_rate: fields.rate("defaultInfantRate")?,
    })
}

pub fn new_availability(body: &Value) -> ValidationResult<NewAvailability> {
    let fields = Fields::from_body(body)?;
    fields.require_all(&AVAILABILITY_REQUIRED_FIELDS)?;
    Ok(NewAvailability {
        date: required("date", fields.date()?)?,
        is_available: required("isAvailable", fields.is_available()?)?,
        base_rate: required("baseRate", fields.rate("baseRate")?)?,
        adult_rate: required("adultRate", fields.rate("adultRate")?)?,
        child_rate: required("childRate", fields.rate("childRate")?)?,
        infant_rate: fields.rate("infantRate")?.unwrap_or(0.0),
        boat_id: required("boatId", fields.reference("boatId")?)?,
    })
}

/// `date` and `boatId` in the body are ignored.
pub fn availability_patch(body: &Value) -> ValidationResult<AvailabilityPatch> {
    let fields = Fields::from_body(body)?;
    Ok(AvailabilityPatch {
        is_available: fields.is_available()?,
        base_rate: fields.rate("baseRate")?,
        adult_rate: fields.rate("adultRate")?,
        child_rate: fields.rate("childRate")?,
        infant_rate: fields.rate("infantRate")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn err<T: std::fmt::Debug>(result: ValidationResult<T>) -> String {
        result.unwrap_err().0
    }

    fn boat_body() -> Value {
        json!({
            "numberOfBedrooms": 2,
            "boatType": "luxury",
            "minAdultsRequired": 2,
            "defaultBaseRate": 9000,
            "defaultAdultRate": 1500,
            "defaultChildRate": 750,
            "agencyId": "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f"
        })
    }

    #[test]
    fn agency_requires_name_then_phone() {
        assert_eq!(
            err(new_agency(&json!({ "phone": "9447888888" }))),
            "Missing required field: name"
        );
        assert_eq!(
            err(new_agency(&json!({ "name": "Boat Co", "phone": null }))),
            "Missing required field: phone"
        );
    }

    #[test]
    fn phone_must_be_ten_digits() {
        for bad in ["12345", "12345678901", "94478888a8", "+944788888"] {
            assert_eq!(
                err(new_agency(&json!({ "name": "Boat Co", "phone": bad }))),
                "Invalid phone number. Should be a 10-digit number",
                "{bad}"
            );
        }
        let agency = new_agency(&json!({ "name": "Boat Co", "phone": 9447888888u64 })).unwrap();
        assert_eq!(agency.phone, "9447888888");
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(new_agency(&json!({ "name": "A", "phone": "1234567890" })).is_err());
        assert!(new_agency(&json!({ "name": "A".repeat(26), "phone": "1234567890" })).is_err());
        assert!(new_agency(&json!({ "name": "AB", "phone": "1234567890" })).is_ok());
    }

    #[test]
    fn agency_patch_ignores_boat_ids() {
        let patch = agency_patch(&json!({ "name": "Renamed", "boatIds": ["x"] })).unwrap();
        assert_eq!(
            patch,
            AgencyPatch {
                name: Some("Renamed".into()),
                phone: None
            }
        );
    }

    #[test]
    fn boat_defaults_infant_rate_to_zero() {
        let boat = new_boat(&boat_body()).unwrap();
        assert_eq!(boat.default_infant_rate, 0.0);
        assert_eq!(boat.boat_type, BoatType::Luxury);
        assert_eq!(boat.number_of_bedrooms, 2);
    }

    #[test]
    fn zero_values_are_present() {
        let mut body = boat_body();
        body["numberOfBedrooms"] = json!(0);
        body["defaultChildRate"] = json!(0);
        let boat = new_boat(&body).unwrap();
        assert_eq!(boat.number_of_bedrooms, 0);
        assert_eq!(boat.default_child_rate, 0.0);
    }

    #[test]
    fn boat_range_and_enum_errors() {
        let mut body = boat_body();
        body["numberOfBedrooms"] = json!(11);
        assert_eq!(
            err(new_boat(&body)),
            "Number of bedrooms must be between 0 and 10"
        );

        let mut body = boat_body();
        body["minAdultsRequired"] = json!(0);
        assert_eq!(
            err(new_boat(&body)),
            "Minimum number of adults required must be greater than 0"
        );

        let mut body = boat_body();
        body["boatType"] = json!("yacht");
        assert_eq!(
            err(new_boat(&body)),
            "Boat type must be one of the following: deluxe, premium, luxury"
        );

        let mut body = boat_body();
        body["numberOfBedrooms"] = json!(2.5);
        assert_eq!(err(new_boat(&body)), "numberOfBedrooms must be an integer");
    }

    #[test]
    fn boat_missing_field_is_named() {
        let mut body = boat_body();
        body.as_object_mut().unwrap().remove("defaultAdultRate");
        assert_eq!(
            err(new_boat(&body)),
            "Missing required field: defaultAdultRate"
        );
    }

    #[test]
    fn boat_agency_id_must_be_uuid() {
        let mut body = boat_body();
        body["agencyId"] = json!("invalid");
        assert_eq!(err(new_boat(&body)), "Invalid agencyId");
    }

    #[test]
    fn boat_patch_checks_only_supplied_fields() {
        assert_eq!(boat_patch(&json!({})).unwrap(), BoatPatch::default());
        assert_eq!(
            err(boat_patch(&json!({ "numberOfBedrooms": 100 }))),
            "Number of bedrooms must be between 0 and 10"
        );
    }

    #[test]
    fn dates_are_normalized_to_midnight() {
        let day = parse_day("2023-09-02T18:30:45.123Z").unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (2023, 9, 2));
        assert_eq!(
            (day.hour(), day.minute(), day.second(), day.nanosecond()),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in [
            "2023-09-02",
            "2023-09-02T00:00:00Z",
            "2023-09-02T00:00:00.000+05:30",
            "2023-13-02T00:00:00.000Z",
            "2023-02-30T00:00:00.000Z",
            " 2023-09-02T00:00:00.000Z",
            "2023-09-02T00:00:00.000Z\n",
            "2023-09-02T00:00:00.0000Z",
            "٢٠٢٣-09-02T00:00:00.000Z",
        ] {
            assert_eq!(parse_day(bad).unwrap_err().0, "Invalid date format", "{bad}");
        }
    }

    #[test]
    fn availability_flag_must_be_boolean() {
        let body = json!({
            "date": "2023-09-02T00:00:00.000Z",
            "isAvailable": "true",
            "baseRate": 9000,
            "adultRate": 500,
            "childRate": 300,
            "boatId": "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f"
        });
        assert_eq!(err(new_availability(&body)), "isAvailable must be a boolean");
    }

    #[test]
    fn availability_false_flag_is_present() {
        let body = json!({
            "date": "2023-09-02T00:00:00.000Z",
            "isAvailable": false,
            "baseRate": 9000,
            "adultRate": 500,
            "childRate": 300,
            "boatId": "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f"
        });
        let availability = new_availability(&body).unwrap();
        assert!(!availability.is_available);
        assert_eq!(availability.infant_rate, 0.0);
    }

    #[test]
    fn availability_boat_id_must_be_uuid() {
        let body = json!({
            "date": "2023-09-02T00:00:00.000Z",
            "isAvailable": true,
            "baseRate": 9000,
            "adultRate": 500,
            "childRate": 300,
            "boatId": "invalid"
        });
        assert_eq!(err(new_availability(&body)), "Invalid boatId");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            err(new_agency(&json!(["name"]))),
            "Request body must be a JSON object"
        );
    }
}
