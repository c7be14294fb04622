//! Layered fluid curves with phase-offset undulation.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::Quality;

const LAYER_COUNT: usize = 5;

/// Stacked flowing bands; each layer undulates with its own phase offset
/// and band energy, filled downward so layers occlude like liquid depth.
pub struct Fluid {
    segments: usize,
    /// Per-layer smoothed energy so the surface moves like mass, not light
    energies: Vec<f32>,
}

impl Fluid {
    /// Create an uninitialized fluid stack
    pub fn new() -> Self {
        Self {
            segments: 0,
            energies: Vec::new(),
        }
    }
}

impl Default for Fluid {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Fluid {
    fn name(&self) -> &'static str {
        "fluid"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.segments = quality.scale_count(64);
        self.energies = vec![0.0; LAYER_COUNT];
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.energies.is_empty() {
            return;
        }

        let segments = self.segments.max(2);
        let beat_swell = if frame.beat { 1.3 } else { 1.0 };
        let mut outline = Vec::with_capacity(segments + 3);

        for layer in 0..LAYER_COUNT {
            let lo = layer as f32 / LAYER_COUNT as f32;
            let hi = (layer + 1) as f32 / LAYER_COUNT as f32;
            let raw = frame.level(lo, hi);
            // Heavy smoothing keeps the liquid feel
            self.energies[layer] += (raw - self.energies[layer]) * 0.12;
            let energy = self.energies[layer];

            let Some(color) = frame.palette.cycle(layer) else { continue };
            let baseline = frame.height * (0.45 + 0.13 * layer as f32);
            let amplitude = frame.height * (0.05 + energy * 0.16) * beat_swell;
            let phase = frame.rotation * (1.2 + layer as f32 * 0.45);

            outline.clear();
            for s in 0..=segments {
                let t = s as f32 / segments as f32;
                let x = t * frame.width;
                let swell = (t * std::f32::consts::TAU * 1.5 + phase).sin()
                    + 0.4 * (t * std::f32::consts::TAU * 3.7 - phase * 1.3).sin()
                    + 0.2 * (t * std::f32::consts::TAU * 6.1 + phase * 0.8).sin();
                outline.push(Vec2::new(x, baseline + swell * amplitude));
            }
            // Close down to the bottom edge so the band fills like liquid
            outline.push(Vec2::new(frame.width, frame.height));
            outline.push(Vec2::new(0.0, frame.height));

            canvas.fill_polygon(&outline, color, 0.25 + energy * 0.3);
            canvas.stroke_polyline(&outline[..=segments], 1.5, color, 0.6);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings, SPECTRUM_MAX};

    #[test]
    fn test_energies_track_input_smoothly() {
        let mut fluid = Fluid::new();
        fluid.init(128.0, 72.0, Quality::Med);
        let mut surface = Surface::new(128, 72, 1.0).unwrap();
        let palette = PalettePreset::Ocean.palette();
        let settings = VisualizerSettings::default();

        let loud = vec![SPECTRUM_MAX; 64];
        let input = FrameInput {
            spectrum: &loud,
            alt_spectrum: None,
            width: 128.0,
            height: 72.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.1,
            beat: false,
        };
        fluid.draw(&mut surface.canvas(), &input);
        let first = fluid.energies[0];
        assert!(first > 0.0 && first < 1.0, "one frame must not saturate");

        for _ in 0..200 {
            fluid.draw(&mut surface.canvas(), &input);
        }
        assert!(fluid.energies[0] > 0.9, "sustained input saturates eventually");
    }
}
