//! Floor-plan render library
//!
//! Scene-graph boundary and the orchestrator that rebuilds the visible shape
//! list, dimension labels and selection overlay.

pub mod dimensions;
mod renderer;
pub mod scene;

pub use dimensions::{dimension_anchor, format_length};
pub use renderer::{RenderContext, RenderStyle, Renderer};
pub use scene::{
    NodeAttrs, NodeHandle, Primitive, PrimitiveKind, RecordingScene, RenderError, RenderResult,
    SceneGraph, SceneLayer, SceneNode, Style, TextAlign, TextRun,
};
