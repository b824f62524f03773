//! Slot allocation engine.
//!
//! A [`ParkingLot`] owns four structures that always move together:
//! - slot storage (`Vec<Option<Car>>`, 1-indexed externally)
//! - the registration index (registration number -> slot number)
//! - the [`ColorIndex`] (normalized color -> registration numbers)
//! - the [`Waitlist`] (cars that arrived while the lot was full)
//!
//! Every operation either completes all of its index updates or fails
//! before touching any of them.

mod car;
mod engine;
mod index;
mod waitlist;

pub use car::{Car, SlotStatus, normalize_color};
pub use engine::{LotError, MAX_SLOTS, ParkingLot};
pub use index::ColorIndex;
pub use waitlist::{Waitlist, WaitlistEntry};
