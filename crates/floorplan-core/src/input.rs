//! Host input events and modifier keys.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Lock two-click draws horizontally or vertically.
    pub fn axis_lock(&self) -> bool {
        self.shift
    }

    /// Snap to the coarse grid.
    pub fn coarse_grid(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// Add or remove the clicked object from the selection.
    pub fn toggle_selection(&self) -> bool {
        self.shift
    }
}

/// Pointer event in screen coordinates, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        modifiers: Modifiers,
    },
    /// Wheel zoom around `position`; positive `delta.y` zooms out.
    Scroll { position: Point, delta: Vec2 },
}
