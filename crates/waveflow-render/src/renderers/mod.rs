//! The drawing strategies.
//!
//! Each strategy is an owned-state struct implementing [`crate::Renderer`]:
//! band energies map to a small set of geometric parameters, beats trigger a
//! transient, and every pool has an explicit cap with in-place recycling.

pub mod bars;
pub mod bubbles;
pub mod corona;
pub mod fluid;
pub mod hex_grid;
pub mod kaleidoscope;
pub mod lasers;
pub mod nebula;
pub mod plasma;
pub mod rings;
pub mod ripples;
pub mod starfield;
pub mod synthwave;
pub mod wave_layers;

pub use bars::BarField;
pub use bubbles::Bubbles;
pub use corona::Corona;
pub use fluid::Fluid;
pub use hex_grid::HexGrid;
pub use kaleidoscope::Kaleidoscope;
pub use lasers::Lasers;
pub use nebula::Nebula;
pub use plasma::Plasma;
pub use rings::RingStack;
pub use ripples::Ripples;
pub use starfield::Starfield;
pub use synthwave::Synthwave;
pub use wave_layers::WaveLayers;

use glam::Vec2;

/// Point at `angle`/`radius` around `center`.
pub(crate) fn polar(center: Vec2, angle: f32, radius: f32) -> Vec2 {
    Vec2::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
}
