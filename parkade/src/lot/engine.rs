//! ParkingLot: slot storage plus its registration index, color index and waitlist.

use std::collections::HashMap;

use indexmap::IndexSet;

use super::{Car, ColorIndex, SlotStatus, Waitlist, normalize_color};

/// Upper bound on the total slot count, checked before any allocation.
pub const MAX_SLOTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotError {
    #[error("Parking lot is already initialized")]
    AlreadyInitialized,
    #[error("Parking lot is not initialized yet.")]
    NotInitialized,
    #[error("Number of slots must be positive, got {0}")]
    InvalidSlotCount(i64),
    #[error("Cannot decrement parking slots")]
    InvalidIncrement,
    #[error("Parking lot cannot exceed {max} slots")]
    TooManySlots { max: usize },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("Car {registration_number} is already parked at slot {slot}")]
    AlreadyParked {
        registration_number: String,
        slot: usize,
    },
    #[error("Car {0} is already on the waitlist")]
    AlreadyWaitlisted(String),
    /// The car was queued; it will be parked when a slot frees up.
    #[error("Parking lot is full. You have been added to waitlist")]
    LotFull,
    #[error("Slot {0} does not exist")]
    SlotOutOfRange(usize),
    #[error("Slot already free")]
    SlotAlreadyFree,
    #[error("Car not found")]
    CarNotFound,
    #[error("Car with this registration number {0} is not parked")]
    CarNotParked(String),
    #[error("No cars with color {0} found")]
    NoCarsOfColor(String),
}

/// Single-lot allocation engine.
///
/// Slot numbers are 1-based and stable: expansion only appends.
/// Allocation always takes the lowest-numbered empty slot.
#[derive(Debug, Default)]
pub struct ParkingLot {
    slots: Vec<Option<Car>>,
    registrations: HashMap<String, usize>,
    colors: ColorIndex,
    waitlist: Waitlist,
}

impl ParkingLot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn available_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    pub fn initialize(&mut self, slot_count: i64) -> Result<usize, LotError> {
        if self.is_initialized() {
            return Err(LotError::AlreadyInitialized);
        }
        if slot_count <= 0 {
            return Err(LotError::InvalidSlotCount(slot_count));
        }
        let count = usize::try_from(slot_count)
            .ok()
            .filter(|&c| c <= MAX_SLOTS)
            .ok_or(LotError::TooManySlots { max: MAX_SLOTS })?;

        self.slots = vec![None; count];
        tracing::info!(total_slots = count, "Parking lot initialized");
        Ok(count)
    }

    pub fn expand(&mut self, increment: i64) -> Result<usize, LotError> {
        self.ensure_initialized()?;
        if increment < 0 {
            return Err(LotError::InvalidIncrement);
        }
        let total = usize::try_from(increment)
            .ok()
            .and_then(|k| self.slots.len().checked_add(k))
            .filter(|&t| t <= MAX_SLOTS)
            .ok_or(LotError::TooManySlots { max: MAX_SLOTS })?;

        self.slots.resize(total, None);
        tracing::info!(
            increment,
            total_slots = self.slots.len(),
            "Parking lot expanded"
        );
        Ok(self.slots.len())
    }

    /// Park a car in the lowest-numbered empty slot.
    ///
    /// When no slot is empty the car is appended to the waitlist and
    /// `LotFull` is returned.
    pub fn allocate(&mut self, registration_number: &str, color: &str) -> Result<usize, LotError> {
        self.ensure_initialized()?;
        if registration_number.trim().is_empty() {
            return Err(LotError::EmptyField {
                field: "registration number",
            });
        }
        if color.trim().is_empty() {
            return Err(LotError::EmptyField { field: "color" });
        }
        if let Some(&slot) = self.registrations.get(registration_number) {
            return Err(LotError::AlreadyParked {
                registration_number: registration_number.to_string(),
                slot,
            });
        }
        if self.waitlist.contains(registration_number) {
            return Err(LotError::AlreadyWaitlisted(registration_number.to_string()));
        }

        let car = Car::new(registration_number, color);
        match self.first_free() {
            Some(index) => Ok(self.place(index, car)),
            None => {
                self.waitlist.push(car);
                tracing::info!(
                    registration_number,
                    waitlisted = self.waitlist.len(),
                    "Lot full - car added to waitlist"
                );
                Err(LotError::LotFull)
            }
        }
    }

    /// Free a slot by number, then promote the head of the waitlist.
    ///
    /// Returns the slot number that was freed, not where a promoted car landed.
    pub fn free_by_slot(&mut self, slot_number: usize) -> Result<usize, LotError> {
        self.ensure_initialized()?;
        let index = self.index_of(slot_number)?;
        if self.vacate(index).is_none() {
            return Err(LotError::SlotAlreadyFree);
        }
        self.promote_waitlisted();
        Ok(slot_number)
    }

    /// Free whichever slot holds `registration_number`, then promote the head of the waitlist.
    pub fn free_by_registration(&mut self, registration_number: &str) -> Result<usize, LotError> {
        self.ensure_initialized()?;
        let slot = *self
            .registrations
            .get(registration_number)
            .ok_or(LotError::CarNotFound)?;

        if self.vacate(slot - 1).is_none() {
            debug_assert!(false, "registration index points at an empty slot");
            tracing::error!(
                slot,
                registration_number,
                "Bug: registration index points at an empty slot"
            );
            self.registrations.remove(registration_number);
            return Err(LotError::CarNotFound);
        }
        self.promote_waitlisted();
        Ok(slot)
    }

    pub fn registration_numbers_by_color(&self, color: &str) -> Result<Vec<String>, LotError> {
        Ok(self.color_members(color)?.iter().cloned().collect())
    }

    pub fn slot_numbers_by_color(&self, color: &str) -> Result<Vec<usize>, LotError> {
        let members = self.color_members(color)?;
        Ok(members
            .iter()
            .filter_map(|r| self.registrations.get(r).copied())
            .collect())
    }

    pub fn slot_number_by_registration(&self, registration_number: &str) -> Result<usize, LotError> {
        self.ensure_initialized()?;
        self.registrations
            .get(registration_number)
            .copied()
            .ok_or_else(|| LotError::CarNotParked(registration_number.to_string()))
    }

    /// Occupied slots in ascending order. Empty before initialization.
    pub fn parking_status(&self) -> Vec<SlotStatus> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|car| SlotStatus::new(index + 1, car)))
            .collect()
    }

    fn ensure_initialized(&self) -> Result<(), LotError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(LotError::NotInitialized)
        }
    }

    fn index_of(&self, slot_number: usize) -> Result<usize, LotError> {
        if slot_number == 0 || slot_number > self.slots.len() {
            return Err(LotError::SlotOutOfRange(slot_number));
        }
        Ok(slot_number - 1)
    }

    fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    fn color_members(&self, color: &str) -> Result<&IndexSet<String>, LotError> {
        self.ensure_initialized()?;
        let key = normalize_color(color);
        match self.colors.get(&key) {
            Some(members) => Ok(members),
            None => Err(LotError::NoCarsOfColor(key)),
        }
    }

    fn place(&mut self, index: usize, car: Car) -> usize {
        let slot = index + 1;
        self.colors.insert(&car.color, &car.registration_number);
        self.registrations
            .insert(car.registration_number.clone(), slot);
        tracing::debug!(
            slot,
            registration_number = %car.registration_number,
            color = %car.color,
            "Car parked"
        );
        self.slots[index] = Some(car);
        slot
    }

    fn vacate(&mut self, index: usize) -> Option<Car> {
        let car = self.slots.get_mut(index)?.take()?;
        self.colors.remove(&car.color, &car.registration_number);
        self.registrations.remove(&car.registration_number);
        tracing::debug!(
            slot = index + 1,
            registration_number = %car.registration_number,
            "Slot freed"
        );
        Some(car)
    }

    fn promote_waitlisted(&mut self) {
        let Some(entry) = self.waitlist.pop_front() else {
            return;
        };
        let Some(index) = self.first_free() else {
            self.waitlist.requeue_front(entry);
            return;
        };

        let registration_number = entry.car.registration_number.clone();
        let waited = chrono::Utc::now() - entry.queued_at;
        let slot = self.place(index, entry.car);
        tracing::info!(
            slot,
            registration_number = %registration_number,
            waited_ms = waited.num_milliseconds(),
            remaining = self.waitlist.len(),
            "Promoted car from waitlist"
        );
    }
}
