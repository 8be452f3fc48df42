//! Floor-plan editor core library
//!
//! Object model, layers, snapping, undo history and the selection/editing
//! state machine. Nothing here draws; see `floorplan-render`.

pub mod camera;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod history;
pub mod input;
pub mod layers;
pub mod layout;
pub mod objects;
pub mod selection;
pub mod snap;
pub mod tools;

pub use camera::Camera;
pub use config::EditorConfig;
pub use controller::{DragState, EditContext, Outcome, SelectionController};
pub use document::{DEFAULT_SCALE, FloorPlan};
pub use error::{ConfigError, EditError, LayoutError};
pub use history::{History, MAX_UNDO_HISTORY};
pub use input::{Modifiers, PointerEvent};
pub use layers::{Layer, LayerId};
pub use layout::{LAYOUT_VERSION, LayoutDocument};
pub use objects::{
    DrawableObject, FontStyle, Label, ObjectId, ObjectTrait, Rectangle, RgbaColor, WALL_THICKNESS,
    Wall,
};
pub use selection::{Handle, HandleKind, Selection, SelectionOverlay};
pub use snap::{SnapKind, SnapRequest, SnapResult, SnapTargets, Snapper, snap_to_grid};
pub use tools::{ToolKind, ToolManager, ToolPreview, ToolState, ToolStyle};
