//! Mark table (`m{a-z}`).
//!
//! Marks store raw char offsets and are not adjusted when text before them changes. Readers
//! clamp to the current document length on use.

use std::collections::BTreeMap;
use tracing::trace;

use crate::StateError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkTable {
    marks: BTreeMap<char, usize>,
}

impl MarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: char, offset: usize) -> Result<(), StateError> {
        if !name.is_ascii_lowercase() {
            return Err(StateError::InvalidMark(name));
        }
        self.marks.insert(name, offset);
        trace!(target: "state.marks", mark = %name, offset, "mark_set");
        Ok(())
    }

    /// Stored offset clamped to `len`.
    pub fn get(&self, name: char, len: usize) -> Option<usize> {
        self.marks.get(&name).map(|&o| o.min(len))
    }

    pub fn remove(&mut self, name: char) -> bool {
        self.marks.remove(&name).is_some()
    }

    pub fn clear(&mut self) {
        if !self.marks.is_empty() {
            trace!(target: "state.marks", count = self.marks.len(), "marks_cleared");
        }
        self.marks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.marks.iter().map(|(&c, &o)| (c, o))
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
