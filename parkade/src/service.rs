//! ParkingService: transport-agnostic owner of the parking lot.
//!
//! This service owns:
//! - The [`ParkingLot`] engine behind a single mutex
//! - Health snapshots for the health check
//! - Shutdown coordination (bidirectional)
//!
//! Every engine call, read or write, runs inside one lock acquisition, so an
//! allocate-then-index-update or free-then-promote sequence is never observed
//! half-done. Transports (HTTP, etc.) delegate to this service.

use std::sync::{Mutex as StdMutex, MutexGuard};

use tokio::sync::watch;

use crate::health::LotHealth;
use crate::lot::{LotError, ParkingLot, SlotStatus, WaitlistEntry};
use crate::version::VersionInfo;

/// Snapshot of lot health for transports to query.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub state: LotHealth,
    pub total_slots: usize,
    pub available_slots: usize,
    pub waitlisted: usize,
    pub version: VersionInfo,
}

impl HealthSnapshot {
    pub fn is_full(&self) -> bool {
        self.state == LotHealth::Full
    }
}

pub struct ParkingService {
    lot: StdMutex<ParkingLot>,

    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,

    version: VersionInfo,
}

impl Default for ParkingService {
    fn default() -> Self {
        Self::new()
    }
}

impl ParkingService {
    /// Create with an uninitialized lot.
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            lot: StdMutex::new(ParkingLot::new()),
            shutdown_tx,
            shutdown_rx,
            version: VersionInfo::new(),
        }
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    /// Lock the lot. On poison, log and keep going with the inner state:
    /// engine operations never leave the indexes out of step with the slots.
    fn lock(&self) -> MutexGuard<'_, ParkingLot> {
        match self.lot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Parking lot mutex poisoned - recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn initialize(&self, slot_count: i64) -> Result<usize, LotError> {
        self.lock().initialize(slot_count)
    }

    pub fn expand(&self, increment: i64) -> Result<usize, LotError> {
        self.lock().expand(increment)
    }

    pub fn allocate(&self, registration_number: &str, color: &str) -> Result<usize, LotError> {
        self.lock().allocate(registration_number, color)
    }

    pub fn free_by_slot(&self, slot_number: usize) -> Result<usize, LotError> {
        self.lock().free_by_slot(slot_number)
    }

    pub fn free_by_registration(&self, registration_number: &str) -> Result<usize, LotError> {
        self.lock().free_by_registration(registration_number)
    }

    pub fn registration_numbers_by_color(&self, color: &str) -> Result<Vec<String>, LotError> {
        self.lock().registration_numbers_by_color(color)
    }

    pub fn slot_numbers_by_color(&self, color: &str) -> Result<Vec<usize>, LotError> {
        self.lock().slot_numbers_by_color(color)
    }

    pub fn slot_number_by_registration(&self, registration_number: &str) -> Result<usize, LotError> {
        self.lock().slot_number_by_registration(registration_number)
    }

    pub fn parking_status(&self) -> Vec<SlotStatus> {
        self.lock().parking_status()
    }

    pub fn waitlist(&self) -> Vec<WaitlistEntry> {
        self.lock().waitlist().iter().cloned().collect()
    }

    pub fn health(&self) -> HealthSnapshot {
        let lot = self.lock();
        let total_slots = lot.total_slots();
        let available_slots = lot.available_slots();

        HealthSnapshot {
            state: LotHealth::from_counts(total_slots, available_slots),
            total_slots,
            available_slots,
            waitlisted: lot.waitlist().len(),
            version: self.version.clone(),
        }
    }

    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }
}
