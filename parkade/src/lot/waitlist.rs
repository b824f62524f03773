//! FIFO queue of cars that arrived while the lot was full.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Car;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistEntry {
    #[serde(flatten)]
    pub car: Car,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Waitlist {
    queue: VecDeque<WaitlistEntry>,
}

impl Waitlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, car: Car) {
        self.queue.push_back(WaitlistEntry {
            car,
            queued_at: Utc::now(),
        });
    }

    /// Put an entry back at the head, keeping its original queue time.
    pub(crate) fn requeue_front(&mut self, entry: WaitlistEntry) {
        self.queue.push_front(entry);
    }

    pub fn pop_front(&mut self) -> Option<WaitlistEntry> {
        self.queue.pop_front()
    }

    pub fn contains(&self, registration_number: &str) -> bool {
        self.queue
            .iter()
            .any(|e| e.car.registration_number == registration_number)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitlistEntry> {
        self.queue.iter()
    }
}
