//! Request Validation
//!
//! Turns an untyped JSON mapping into a strongly-typed `MeasurementSet`
//! (plus an optional validated `GeoPoint`). Everything downstream of this
//! module works on typed values only; no component re-inspects raw input.
//!
//! Two deliberately different policies are in play:
//! - Missing fields are collected and reported together, in declared order.
//! - Type and range checks run field-by-field in declared order and stop at
//!   the first violation.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One validated soil/climate measurement field: name plus inclusive bounds.
///
/// `bounds_text` is the human-readable range used in error messages
/// (e.g. "0-140"), kept separate so integer bounds do not render as "0.0".
pub struct FieldSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub bounds_text: &'static str,
}

/// The seven required measurements, in declared order.
///
/// This order doubles as the feature order the classifier was trained with;
/// see `features::assemble`.
pub static FIELD_SPECS: [FieldSpec; 7] = [
    FieldSpec { name: "N", min: 0.0, max: 140.0, bounds_text: "0-140" },
    FieldSpec { name: "P", min: 5.0, max: 145.0, bounds_text: "5-145" },
    FieldSpec { name: "K", min: 5.0, max: 205.0, bounds_text: "5-205" },
    FieldSpec { name: "temperature", min: 8.8, max: 43.7, bounds_text: "8.8-43.7" },
    FieldSpec { name: "humidity", min: 14.0, max: 100.0, bounds_text: "14-100" },
    FieldSpec { name: "ph", min: 3.5, max: 10.0, bounds_text: "3.5-10.0" },
    FieldSpec { name: "rainfall", min: 20.0, max: 300.0, bounds_text: "20-300" },
];

/// A complete, validated set of soil and climate measurements.
///
/// Constructed only by [`validate`]; every field is guaranteed to lie within
/// its `FieldSpec` bounds. Lives for a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSet {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

/// Optional validated geolocation annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Validation failure taxonomy. All variants map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more required fields absent. Names in declared field order.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A present field did not parse as a real number.
    #[error("Invalid {field} value: must be a valid number")]
    InvalidType { field: &'static str },

    /// A parsed field fell outside its inclusive bounds.
    #[error("Invalid {field} value: must be between {bounds}")]
    OutOfRange { field: &'static str, bounds: &'static str },

    /// Latitude/longitude supplied but non-numeric or out of range.
    #[error("{0}")]
    InvalidLocation(String),
}

/// Parse a JSON value as a real number.
///
/// Accepts JSON numbers and numeric strings (the service has always taken
/// both, so string-typed form input keeps working).
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Validate a raw request body.
///
/// Order of checks:
/// 1. Presence of all seven required fields (aggregated failure).
/// 2. Per field, in declared order: numeric parse, then range. First
///    violation wins.
/// 3. Geolocation, only when BOTH `latitude` and `longitude` are present.
///    A lone coordinate is ignored, not rejected.
pub fn validate(
    body: &serde_json::Map<String, Value>,
) -> Result<(MeasurementSet, Option<GeoPoint>), ValidationError> {
    let missing: Vec<String> = FIELD_SPECS
        .iter()
        .filter(|spec| !body.contains_key(spec.name))
        .map(|spec| spec.name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut values = [0.0_f64; 7];
    for (slot, spec) in values.iter_mut().zip(FIELD_SPECS.iter()) {
        // Presence was established above, so the lookup cannot miss.
        let raw = body
            .get(spec.name)
            .ok_or(ValidationError::InvalidType { field: spec.name })?;

        let value =
            parse_number(raw).ok_or(ValidationError::InvalidType { field: spec.name })?;

        if value < spec.min || value > spec.max {
            return Err(ValidationError::OutOfRange {
                field: spec.name,
                bounds: spec.bounds_text,
            });
        }

        *slot = value;
    }

    let [n, p, k, temperature, humidity, ph, rainfall] = values;
    let measurements = MeasurementSet { n, p, k, temperature, humidity, ph, rainfall };

    let location = validate_location(body)?;

    Ok((measurements, location))
}

/// Validate the optional latitude/longitude pair.
///
/// Only triggers when both keys are present, matching the service's
/// long-standing behavior of ignoring a lone coordinate.
fn validate_location(
    body: &serde_json::Map<String, Value>,
) -> Result<Option<GeoPoint>, ValidationError> {
    let (lat_raw, lng_raw) = match (body.get("latitude"), body.get("longitude")) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Ok(None),
    };

    let latitude = parse_number(lat_raw).ok_or_else(|| {
        ValidationError::InvalidLocation(
            "Latitude and longitude must be valid numbers".to_string(),
        )
    })?;
    let longitude = parse_number(lng_raw).ok_or_else(|| {
        ValidationError::InvalidLocation(
            "Latitude and longitude must be valid numbers".to_string(),
        )
    })?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::InvalidLocation(
            "Latitude must be between -90 and 90 degrees".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::InvalidLocation(
            "Longitude must be between -180 and 180 degrees".to_string(),
        ));
    }

    Ok(Some(GeoPoint { latitude, longitude }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn body(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().expect("test body must be an object").clone()
    }

    fn valid_body() -> serde_json::Map<String, Value> {
        body(json!({
            "N": 80, "P": 40, "K": 30,
            "temperature": 25, "humidity": 70, "ph": 6.5, "rainfall": 150
        }))
    }

    #[test]
    fn test_valid_body_produces_measurement_set() {
        let (m, location) = validate(&valid_body()).unwrap();
        assert_relative_eq!(m.n, 80.0);
        assert_relative_eq!(m.ph, 6.5);
        assert_relative_eq!(m.rainfall, 150.0);
        assert!(location.is_none());
    }

    #[test]
    fn test_missing_fields_are_aggregated_in_declared_order() {
        let result = validate(&body(json!({ "N": 80, "P": 40 })));
        match result {
            Err(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["K", "temperature", "humidity", "ph", "rainfall"]);
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_reported_even_when_present_fields_invalid() {
        // Presence check runs to completion before any type/range check.
        let result = validate(&body(json!({ "N": "not-a-number" })));
        match result {
            Err(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields.len(), 6);
                assert!(!fields.contains(&"N".to_string()));
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_range_check_stops_at_first_violation_in_declared_order() {
        // Both N and rainfall are out of range; only N is reported.
        let mut b = valid_body();
        b.insert("N".into(), json!(200));
        b.insert("rainfall".into(), json!(500));
        match validate(&b) {
            Err(ValidationError::OutOfRange { field, bounds }) => {
                assert_eq!(field, "N");
                assert_eq!(bounds, "0-140");
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for (field, value) in [
            ("N", 0.0), ("N", 140.0),
            ("temperature", 8.8), ("temperature", 43.7),
            ("ph", 3.5), ("ph", 10.0),
        ] {
            let mut b = valid_body();
            b.insert(field.into(), json!(value));
            assert!(validate(&b).is_ok(), "{}={} should be in range", field, value);
        }
    }

    #[test]
    fn test_every_field_rejected_just_outside_bounds() {
        for spec in FIELD_SPECS.iter() {
            for value in [spec.min - 0.1, spec.max + 0.1] {
                let mut b = valid_body();
                b.insert(spec.name.into(), json!(value));
                match validate(&b) {
                    Err(ValidationError::OutOfRange { field, .. }) => {
                        assert_eq!(field, spec.name);
                    }
                    other => panic!(
                        "expected OutOfRange for {}={}, got {:?}",
                        spec.name, value, other
                    ),
                }
            }
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut b = valid_body();
        b.insert("ph".into(), json!(" 6.5 "));
        let (m, _) = validate(&b).unwrap();
        assert_relative_eq!(m.ph, 6.5);
    }

    #[test]
    fn test_non_numeric_value_is_a_type_error() {
        let mut b = valid_body();
        b.insert("humidity".into(), json!("humid"));
        match validate(&b) {
            Err(ValidationError::InvalidType { field }) => assert_eq!(field, "humidity"),
            other => panic!("expected InvalidType, got {:?}", other),
        }
    }

    #[test]
    fn test_type_error_message_names_the_field() {
        let err = ValidationError::InvalidType { field: "humidity" };
        assert_eq!(err.to_string(), "Invalid humidity value: must be a valid number");
    }

    #[test]
    fn test_range_error_message_names_field_and_bounds() {
        let err = ValidationError::OutOfRange { field: "N", bounds: "0-140" };
        assert_eq!(err.to_string(), "Invalid N value: must be between 0-140");
    }

    #[test]
    fn test_valid_location_is_carried_through() {
        let mut b = valid_body();
        b.insert("latitude".into(), json!(12.9716));
        b.insert("longitude".into(), json!(77.5946));
        let (_, location) = validate(&b).unwrap();
        let location = location.unwrap();
        assert_relative_eq!(location.latitude, 12.9716);
        assert_relative_eq!(location.longitude, 77.5946);
    }

    #[test]
    fn test_latitude_out_of_range_is_rejected() {
        let mut b = valid_body();
        b.insert("latitude".into(), json!(91));
        b.insert("longitude".into(), json!(10));
        match validate(&b) {
            Err(ValidationError::InvalidLocation(msg)) => {
                assert!(msg.contains("Latitude"), "unexpected message: {}", msg);
            }
            other => panic!("expected InvalidLocation, got {:?}", other),
        }
    }

    #[test]
    fn test_longitude_out_of_range_is_rejected() {
        let mut b = valid_body();
        b.insert("latitude".into(), json!(10));
        b.insert("longitude".into(), json!(-181));
        assert!(matches!(validate(&b), Err(ValidationError::InvalidLocation(_))));
    }

    #[test]
    fn test_lone_coordinate_is_ignored() {
        // Only one half of the pair present: not an error, no annotation.
        let mut b = valid_body();
        b.insert("latitude".into(), json!(91)); // would be invalid if paired
        let (_, location) = validate(&b).unwrap();
        assert!(location.is_none());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let mut b = valid_body();
        b.insert("soil_type".into(), json!("loam"));
        assert!(validate(&b).is_ok());
    }
}
