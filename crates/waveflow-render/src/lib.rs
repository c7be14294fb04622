//! WaveFlow Render - CPU Rasterization Layer
//!
//! This crate provides the drawing side of the visualizer pipeline:
//! - Raster surface with DPI-aware backing store and trail blending
//! - The renderer contract and its stateful drawing strategies
//! - The visual-mode registry
//! - Bounded sprite cache for pre-rendered particle dots

use thiserror::Error;

pub mod registry;
pub mod renderer;
pub mod renderers;
pub mod sprite;
pub mod surface;

pub use registry::{RendererRegistry, VisualMode};
pub use renderer::{FrameInput, Renderer};
pub use sprite::{SpriteCache, SpriteKey, SpriteKind};
pub use surface::{Canvas, Surface};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A surface cannot be allocated at the requested dimensions
    #[error("Invalid surface size: {0}x{1} at scale {2}")]
    InvalidSurfaceSize(u32, u32, f32),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
