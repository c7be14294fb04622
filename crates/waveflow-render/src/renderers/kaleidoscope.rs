//! Kaleidoscope: one band-driven motif mirrored across wedge slices.

use crate::renderer::{FrameInput, Renderer};
use crate::renderers::polar;
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::Quality;

const BASE_SLICES: usize = 8;
/// Motif elements per slice
const MOTIF_POINTS: usize = 5;

/// A small geometric motif is computed once per frame from band energies,
/// then stamped into every wedge, alternating mirrored orientation.
pub struct Kaleidoscope {
    slices: usize,
}

impl Kaleidoscope {
    /// Create an uninitialized kaleidoscope
    pub fn new() -> Self {
        Self { slices: 0 }
    }
}

impl Default for Kaleidoscope {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Kaleidoscope {
    fn name(&self) -> &'static str {
        "kaleidoscope"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        // Slice count stays even so mirroring pairs up
        self.slices = (quality.scale_count(BASE_SLICES) / 2).max(2) * 2;
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.slices == 0 {
            return;
        }

        let center = Vec2::new(frame.width * 0.5, frame.height * 0.5);
        let max_radius = frame.width.min(frame.height) * 0.48;
        let wedge = std::f32::consts::TAU / self.slices as f32;
        let beat_kick = if frame.beat { 1.15 } else { 1.0 };

        // Motif: a chain of energy-driven anchor points inside one wedge
        let mut motif = [(0.0f32, 0.0f32); MOTIF_POINTS];
        for (m, slot) in motif.iter_mut().enumerate() {
            let t = m as f32 / MOTIF_POINTS as f32;
            let energy = frame.level(t, t + 1.0 / MOTIF_POINTS as f32);
            let local_angle = wedge * (0.15 + 0.7 * t) + (frame.rotation * (1.0 + t)).sin() * 0.1;
            let radius = max_radius * (0.2 + 0.75 * t) * (0.5 + energy * 0.5) * beat_kick;
            *slot = (local_angle, radius);
        }

        for s in 0..self.slices {
            let base = s as f32 * wedge + frame.rotation * 0.5;
            let mirrored = s % 2 == 1;

            let mut prev: Option<Vec2> = None;
            for (m, &(local_angle, radius)) in motif.iter().enumerate() {
                // Odd slices reflect the motif about their leading edge
                let angle = if mirrored {
                    base + wedge - local_angle
                } else {
                    base + local_angle
                };
                let point = polar(center, angle, radius);
                let Some(color) = frame.palette.cycle(m) else { continue };

                canvas.fill_circle(point.x, point.y, 2.5 + radius * 0.02, color, 0.8);
                if let Some(prev) = prev {
                    canvas.stroke_line(prev, point, 1.5, color, 0.5);
                }
                if frame.settings.glow {
                    canvas.glow_circle(point.x, point.y, 6.0 + radius * 0.04, color, 0.1);
                }
                prev = Some(point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{Palette, PalettePreset, VisualizerSettings};

    #[test]
    fn test_slice_count_is_even() {
        for quality in [Quality::Low, Quality::Med, Quality::High] {
            let mut k = Kaleidoscope::new();
            k.init(100.0, 100.0, quality);
            assert_eq!(k.slices % 2, 0);
            assert!(k.slices >= 4);
        }
    }

    #[test]
    fn test_draw_smoke_and_degenerate_inputs() {
        let mut k = Kaleidoscope::new();
        k.init(100.0, 100.0, Quality::High);
        let mut surface = Surface::new(100, 100, 1.0).unwrap();
        let settings = VisualizerSettings::default();
        let palette = PalettePreset::Aurora.palette();
        let spectrum = vec![150.0f32; 64];

        let input = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 100.0,
            height: 100.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.7,
            beat: true,
        };
        k.draw(&mut surface.canvas(), &input);

        let empty = Palette::default();
        let input = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 100.0,
            height: 100.0,
            palette: &empty,
            settings: &settings,
            rotation: 0.7,
            beat: false,
        };
        k.draw(&mut surface.canvas(), &input);
    }
}
