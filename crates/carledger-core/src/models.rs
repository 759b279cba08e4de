//! Core data models for the car ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A car as the client sees it: the ledger key plus the stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub model: String,
    pub make: String,
    pub owner: String,
    #[serde(alias = "colour")]
    pub color: String,
}

impl Car {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        make: impl Into<String>,
        owner: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            make: make.into(),
            owner: owner.into(),
            color: color.into(),
        }
    }

    /// The value stored under this car's key
    pub fn record(&self) -> CarRecord {
        CarRecord {
            model: self.model.clone(),
            make: self.make.clone(),
            owner: self.owner.clone(),
            color: self.color.clone(),
        }
    }

    /// Numeric value of the id, if it parses as one
    pub fn numeric_id(&self) -> Option<f64> {
        numeric_key(&self.id)
    }
}

/// Ledger value for one key. The key itself travels next to it as `Id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRecord {
    pub model: String,
    pub make: String,
    pub owner: String,
    #[serde(alias = "colour")]
    pub color: String,
}

impl CarRecord {
    /// Attach a key to this record
    pub fn with_id(self, id: impl Into<String>) -> Car {
        Car {
            id: id.into(),
            model: self.model,
            make: self.make,
            owner: self.owner,
            color: self.color,
        }
    }
}

/// One row of the all-cars listing, `{"Id": ..., "Record": {...}}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Record")]
    pub record: CarRecord,
}

impl LedgerEntry {
    pub fn into_car(self) -> Car {
        self.record.with_id(self.id)
    }
}

impl From<&Car> for LedgerEntry {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id.clone(),
            record: car.record(),
        }
    }
}

/// Ownership transfer request: car id and the new holder's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderChange {
    pub id: String,
    pub name: String,
}

impl HolderChange {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// What a history entry recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Transfer,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// A write applied to one key, in ledger order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Ledger-wide sequence number, strictly increasing
    pub seq: u64,
    pub kind: ChangeKind,
    /// State of the car after the write
    pub car: Car,
    pub at: DateTime<Utc>,
}

/// Leading number of an id, read the way a browser's `parseFloat` reads it:
/// leading whitespace is skipped and the longest numeric prefix wins, so
/// `"12abc"` is 12. Only the exact word `Infinity` names an infinity.
fn numeric_key(id: &str) -> Option<f64> {
    let s = id.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Sort cars ascending by the numeric value of their id.
///
/// The sort is stable, so equal ids keep their input order. Ids without a
/// leading number go after every numeric id, also in input order.
pub fn sort_by_numeric_id(cars: &mut [Car]) {
    cars.sort_by(|a, b| match (a.numeric_id(), b.numeric_id()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
