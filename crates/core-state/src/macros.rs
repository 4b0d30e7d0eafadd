//! Macro store and recorder.
//!
//! Every key reaching the dispatcher is offered to [`MacroStore::record`] before it is
//! processed. That makes the key that stops a recording (`q`) the last recorded one, so
//! [`MacroStore::stop`] drops it. Playback suspends recording for its duration; suspension
//! nests so a macro that plays another macro stays suspended until the outermost returns.

use std::collections::HashMap;

use core_events::KeyEvent;
use tracing::trace;

use crate::StateError;

#[derive(Debug, Clone)]
struct Recording {
    name: char,
    keys: Vec<KeyEvent>,
}

#[derive(Debug, Default, Clone)]
pub struct MacroStore {
    macros: HashMap<char, Vec<KeyEvent>>,
    recording: Option<Recording>,
    suspended: u32,
    last_played: Option<char>,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin recording into `name`. Uppercase continues the existing lowercase macro.
    pub fn start(&mut self, name: char) -> Result<(), StateError> {
        if !name.is_ascii_alphabetic() {
            return Err(StateError::InvalidRegister(name));
        }
        let slot = name.to_ascii_lowercase();
        let keys = if name.is_ascii_uppercase() {
            self.macros.get(&slot).cloned().unwrap_or_default()
        } else {
            Vec::new()
        };
        trace!(target: "state.macros", register = %slot, append = name.is_ascii_uppercase(), "recording_start");
        self.recording = Some(Recording { name: slot, keys });
        Ok(())
    }

    /// Finish the active recording, dropping the trailing stop key. Returns the slot name and
    /// the number of keys stored.
    pub fn stop(&mut self) -> Option<(char, usize)> {
        let mut rec = self.recording.take()?;
        rec.keys.pop();
        let n = rec.keys.len();
        trace!(target: "state.macros", register = %rec.name, keys = n, "recording_stop");
        self.macros.insert(rec.name, rec.keys);
        Some((rec.name, n))
    }

    pub fn record(&mut self, key: KeyEvent) {
        if self.suspended > 0 {
            return;
        }
        if let Some(rec) = &mut self.recording {
            rec.keys.push(key);
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording_name(&self) -> Option<char> {
        self.recording.as_ref().map(|r| r.name)
    }

    pub fn suspend(&mut self) {
        self.suspended += 1;
    }

    pub fn resume(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    /// Current playback nesting depth.
    pub fn depth(&self) -> u32 {
        self.suspended
    }

    pub fn get(&self, name: char) -> Option<&[KeyEvent]> {
        self.macros
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .filter(|k| !k.is_empty())
    }

    pub fn set(&mut self, name: char, keys: Vec<KeyEvent>) -> Result<(), StateError> {
        if !name.is_ascii_alphabetic() {
            return Err(StateError::InvalidRegister(name));
        }
        self.macros.insert(name.to_ascii_lowercase(), keys);
        Ok(())
    }

    pub fn last_played(&self) -> Option<char> {
        self.last_played
    }

    pub fn set_last_played(&mut self, name: char) {
        self.last_played = Some(name);
    }

    /// Recorded macros sorted by name.
    pub fn entries(&self) -> Vec<(char, &[KeyEvent])> {
        let mut v: Vec<_> = self
            .macros
            .iter()
            .filter(|(_, k)| !k.is_empty())
            .map(|(&c, k)| (c, k.as_slice()))
            .collect();
        v.sort_by_key(|(c, _)| *c);
        v
    }
}
