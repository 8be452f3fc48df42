//! Floor-plan editor application layer
//!
//! Wires the core components and the renderer into one [`Editor`] that a
//! host drives with pointer events and commands.

mod editor;

pub use editor::Editor;
