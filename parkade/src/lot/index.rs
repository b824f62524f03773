//! Color index: normalized color -> registration numbers parked with it.
//!
//! A color key exists only while at least one car of that color is parked.
//! Sets keep arrival order so lookups are deterministic.

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Default)]
pub struct ColorIndex {
    colors: IndexMap<String, IndexSet<String>>,
}

impl ColorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, color: &str, registration_number: &str) {
        self.colors
            .entry(color.to_string())
            .or_default()
            .insert(registration_number.to_string());
    }

    /// Remove one registration number, dropping the color key once its set is empty.
    ///
    /// Returns `false` if the pair was not indexed.
    pub fn remove(&mut self, color: &str, registration_number: &str) -> bool {
        let Some(set) = self.colors.get_mut(color) else {
            return false;
        };
        let removed = set.shift_remove(registration_number);
        if set.is_empty() {
            self.colors.shift_remove(color);
        }
        removed
    }

    pub fn get(&self, color: &str) -> Option<&IndexSet<String>> {
        self.colors.get(color)
    }

    /// Number of distinct colors currently parked.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.colors.iter()
    }
}
