//! Legacy path-segment encodings and sentinel bodies
//!
//! The browser client passes all state in one path segment: a new car as
//! `id-model-make-owner-color`, a holder change as `id-name`. Misses are
//! reported as plain 200 bodies instead of status codes.

use crate::error::{CoreError, CoreResult};
use crate::models::{Car, HolderChange};

/// Body of a `get_car` miss
pub const CAR_NOT_FOUND: &str = "Could not locate car";

/// Body of a `change_holder` miss
pub const HOLDER_CAR_NOT_FOUND: &str = "Error: no car found";

const SEPARATOR: char = '-';
const CAR_FIELDS: usize = 5;

/// Encode a car as `id-model-make-owner-color`
pub fn encode_car(car: &Car) -> String {
    [
        car.id.as_str(),
        car.model.as_str(),
        car.make.as_str(),
        car.owner.as_str(),
        car.color.as_str(),
    ]
    .join("-")
}

/// Check that an id can travel in a legacy payload.
///
/// `id-name` is split at the first hyphen, so an id holding one would name a
/// different car on its way back.
pub fn validate_id(id: &str) -> CoreResult<()> {
    if id.trim().is_empty() {
        return Err(CoreError::InvalidPayload {
            message: "car id must not be empty".to_string(),
        });
    }
    if id.contains(SEPARATOR) {
        return Err(CoreError::InvalidPayload {
            message: format!("car id '{}' must not contain '{}'", id, SEPARATOR),
        });
    }
    Ok(())
}

/// Decode `id-model-make-owner-color`. Exactly five fields, non-empty id.
pub fn decode_car(payload: &str) -> CoreResult<Car> {
    let parts: Vec<&str> = payload.split(SEPARATOR).collect();
    if parts.len() != CAR_FIELDS {
        return Err(CoreError::InvalidPayload {
            message: format!(
                "expected {} hyphen separated fields, found {} in '{}'",
                CAR_FIELDS,
                parts.len(),
                payload
            ),
        });
    }
    validate_id(parts[0])?;

    Ok(Car::new(parts[0], parts[1], parts[2], parts[3], parts[4]))
}

/// Encode a holder change as `id-name`
pub fn encode_holder(change: &HolderChange) -> String {
    format!("{}{}{}", change.id, SEPARATOR, change.name)
}

/// Decode `id-name`, splitting at the first hyphen only
pub fn decode_holder(payload: &str) -> CoreResult<HolderChange> {
    match payload.split_once(SEPARATOR) {
        Some((id, name)) if !id.is_empty() => Ok(HolderChange::new(id, name)),
        _ => Err(CoreError::InvalidPayload {
            message: format!("expected id-name, found '{}'", payload),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_car() {
        let car = Car::new("1", "m", "k", "o", "c");
        assert_eq!(encode_car(&car), "1-m-k-o-c");
    }

    #[test]
    fn test_decode_car() {
        let car = decode_car("12-Mustang-Ford-Brad-red").unwrap();
        assert_eq!(car, Car::new("12", "Mustang", "Ford", "Brad", "red"));
    }

    #[test]
    fn test_decode_car_allows_empty_trailing_fields() {
        let car = decode_car("3-Polo-VW--").unwrap();
        assert_eq!(car.owner, "");
        assert_eq!(car.color, "");
    }

    #[test]
    fn test_decode_car_rejects_hyphenated_field() {
        // "Rolls-Royce" adds a sixth field; the encoding cannot carry it
        let err = decode_car("5-Ghost-Rolls-Royce-Ann-black").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPayload { .. }));
    }

    #[test]
    fn test_decode_car_rejects_missing_id() {
        assert!(decode_car("-m-k-o-c").is_err());
        assert!(decode_car(" -m-k-o-c").is_err());
        assert!(decode_car("1-m-k").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("12").is_ok());
        assert!(validate_id("CAR 1").is_ok());

        let err = validate_id("1-A").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPayload { .. }));
        assert!(err.to_string().contains("1-A"));
        assert!(validate_id("").is_err());
        assert!(validate_id("   ").is_err());
    }

    #[test]
    fn test_holder_round_trip_keeps_hyphenated_name() {
        let change = HolderChange::new("1", "Mary-Jane");
        let encoded = encode_holder(&change);
        assert_eq!(encoded, "1-Mary-Jane");
        assert_eq!(decode_holder(&encoded).unwrap(), change);
    }

    #[test]
    fn test_decode_holder_rejects_bad_payload() {
        assert!(decode_holder("alice").is_err());
        assert!(decode_holder("-alice").is_err());
    }
}
