//! Car identity and slot status records.

use serde::Serialize;

/// Canonical form of a color, used both as the index key and the stored value.
pub fn normalize_color(color: &str) -> String {
    color.to_lowercase()
}

/// A car as stored in a slot or on the waitlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Car {
    #[serde(rename = "registration_no")]
    pub registration_number: String,
    /// Always normalized.
    pub color: String,
}

impl Car {
    pub fn new(registration_number: impl Into<String>, color: &str) -> Self {
        Self {
            registration_number: registration_number.into(),
            color: normalize_color(color),
        }
    }
}

/// One occupied slot, as reported by the lot status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub slot_no: usize,
    pub registration_no: String,
    pub color: String,
}

impl SlotStatus {
    pub(crate) fn new(slot_no: usize, car: &Car) -> Self {
        Self {
            slot_no,
            registration_no: car.registration_number.clone(),
            color: car.color.clone(),
        }
    }
}
