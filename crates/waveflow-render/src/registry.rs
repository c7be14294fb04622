//! Visual-mode registry: one instantiated renderer per mode.

use crate::renderer::Renderer;
use crate::renderers::{
    BarField, Bubbles, Corona, Fluid, HexGrid, Kaleidoscope, Lasers, Nebula, Plasma, RingStack,
    Ripples, Starfield, Synthwave, WaveLayers,
};
use serde::{Deserialize, Serialize};

/// The available drawing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualMode {
    /// Mirrored dual-channel bar field
    #[default]
    Bars,
    /// Attractor clusters with orbiting particles
    Nebula,
    /// Rising wobbling sprites
    Bubbles,
    /// Perspective starfield
    Starfield,
    /// Drifting blobs with spark streaks
    Plasma,
    /// Layered twin-sine ribbons
    WaveLayers,
    /// Concentric arc stack
    Rings,
    /// Rotating laser sweeps
    Lasers,
    /// Mirrored wedge slices
    Kaleidoscope,
    /// Hex-grid pulse waves
    HexGrid,
    /// Perspective grid and horizon sun
    Synthwave,
    /// Layered fluid curves
    Fluid,
    /// Radial echo rings
    Ripples,
    /// Eclipse disc with streamers
    Corona,
}

impl VisualMode {
    /// Every mode, in presentation order
    pub const ALL: [VisualMode; 14] = [
        VisualMode::Bars,
        VisualMode::Nebula,
        VisualMode::Bubbles,
        VisualMode::Starfield,
        VisualMode::Plasma,
        VisualMode::WaveLayers,
        VisualMode::Rings,
        VisualMode::Lasers,
        VisualMode::Kaleidoscope,
        VisualMode::HexGrid,
        VisualMode::Synthwave,
        VisualMode::Fluid,
        VisualMode::Ripples,
        VisualMode::Corona,
    ];
}

/// Owns one renderer instance per mode.
///
/// Switching modes never reconstructs the other renderers, so returning to
/// a previous mode resumes its state; only an explicit `init` resets.
pub struct RendererRegistry {
    renderers: Vec<(VisualMode, Box<dyn Renderer>)>,
}

impl RendererRegistry {
    /// Construct the full renderer set
    pub fn new() -> Self {
        let renderers: Vec<(VisualMode, Box<dyn Renderer>)> = vec![
            (VisualMode::Bars, Box::new(BarField::new())),
            (VisualMode::Nebula, Box::new(Nebula::new())),
            (VisualMode::Bubbles, Box::new(Bubbles::new())),
            (VisualMode::Starfield, Box::new(Starfield::new())),
            (VisualMode::Plasma, Box::new(Plasma::new())),
            (VisualMode::WaveLayers, Box::new(WaveLayers::new())),
            (VisualMode::Rings, Box::new(RingStack::new())),
            (VisualMode::Lasers, Box::new(Lasers::new())),
            (VisualMode::Kaleidoscope, Box::new(Kaleidoscope::new())),
            (VisualMode::HexGrid, Box::new(HexGrid::new())),
            (VisualMode::Synthwave, Box::new(Synthwave::new())),
            (VisualMode::Fluid, Box::new(Fluid::new())),
            (VisualMode::Ripples, Box::new(Ripples::new())),
            (VisualMode::Corona, Box::new(Corona::new())),
        ];
        debug_assert_eq!(renderers.len(), VisualMode::ALL.len());
        Self { renderers }
    }

    /// The renderer bound to `mode`
    pub fn get_mut(&mut self, mode: VisualMode) -> &mut dyn Renderer {
        let idx = self
            .renderers
            .iter()
            .position(|(m, _)| *m == mode)
            .expect("registry holds every mode");
        self.renderers[idx].1.as_mut()
    }

    /// Swap in a different renderer for `mode`, returning the old one.
    ///
    /// The replacement is not initialized; the host calls `init` on the
    /// next activation as usual.
    pub fn replace(
        &mut self,
        mode: VisualMode,
        renderer: Box<dyn Renderer>,
    ) -> Box<dyn Renderer> {
        let idx = self
            .renderers
            .iter()
            .position(|(m, _)| *m == mode)
            .expect("registry holds every mode");
        std::mem::replace(&mut self.renderers[idx].1, renderer)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}
