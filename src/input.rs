//! Input snapshot shared between the event source and the loop
//!
//! Input is level-triggered (held keys), so the loop only ever needs the
//! latest state: writers overwrite, the loop copies once per iteration.

use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Absolute pointer position in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pointer {
    pub pos: Vec2,
    /// Pointer is over the play area (only then does it steer)
    pub in_panel: bool,
}

/// Per-frame record of movement intent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub boost: bool,
    /// Alternate control scheme; overrides the directions while in the panel
    pub pointer: Option<Pointer>,
}

impl InputSnapshot {
    /// Pointer target if pointer steering is active
    pub fn pointer_target(&self) -> Option<Vec2> {
        self.pointer.filter(|p| p.in_panel).map(|p| p.pos)
    }
}

/// Last-write-wins input cell
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    inner: Arc<Mutex<InputSnapshot>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot
    pub fn set(&self, snapshot: InputSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Edit the snapshot in place (e.g. a single key event)
    pub fn update(&self, f: impl FnOnce(&mut InputSnapshot)) {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Copy of the latest snapshot
    pub fn snapshot(&self) -> InputSnapshot {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
