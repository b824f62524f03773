//! Lot health states reported on the health check.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotHealth {
    /// No slots allocated yet
    #[default]
    Uninitialized,
    /// At least one empty slot
    Available,
    /// Every slot occupied; new arrivals are waitlisted
    Full,
}

impl LotHealth {
    pub fn from_counts(total_slots: usize, available_slots: usize) -> Self {
        if total_slots == 0 {
            LotHealth::Uninitialized
        } else if available_slots == 0 {
            LotHealth::Full
        } else {
            LotHealth::Available
        }
    }
}
