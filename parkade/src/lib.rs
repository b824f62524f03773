//! parkade: slot allocation engine for a single parking lot.

mod health;
mod version;

pub mod lot;
pub mod service;
pub mod transport;

pub use health::LotHealth;
pub use lot::{Car, LotError, ParkingLot, SlotStatus, WaitlistEntry};
pub use service::{HealthSnapshot, ParkingService};
pub use version::{PARKADE_VERSION, VersionInfo};
