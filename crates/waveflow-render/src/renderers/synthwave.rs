//! Synthwave perspective grid with a bass-lit horizon.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::{Quality, Rgb};

const BASE_VERTICALS: usize = 18;
const SCROLL_ROWS: usize = 14;
/// Horizon height as a fraction of the surface
const HORIZON: f32 = 0.42;
const WIDTH_BOOST_DECAY: f32 = 0.1;

/// Scrolling perspective grid below a glowing horizon sun; beats thicken
/// the grid lines briefly.
pub struct Synthwave {
    verticals: usize,
    width_boost: f32,
}

impl Synthwave {
    /// Create an uninitialized grid
    pub fn new() -> Self {
        Self {
            verticals: 0,
            width_boost: 0.0,
        }
    }
}

impl Default for Synthwave {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Synthwave {
    fn name(&self) -> &'static str {
        "synthwave"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.verticals = quality.scale_count(BASE_VERTICALS);
        self.width_boost = 0.0;
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.verticals == 0 {
            return;
        }

        if frame.beat {
            self.width_boost = 1.0;
        } else {
            self.width_boost -= self.width_boost * WIDTH_BOOST_DECAY * frame.settings.speed;
        }

        let horizon_y = frame.height * HORIZON;
        let vanish = Vec2::new(frame.width * 0.5, horizon_y);
        let bass = frame.bass();
        let mid = frame.mid();
        let grid_color = frame.palette.cycle(0).unwrap_or(Rgb::new(255, 0, 212));
        let sun_color = frame.palette.cycle(1).unwrap_or(Rgb::new(255, 149, 0));
        let line_width = 1.2 + self.width_boost * 2.0;

        // Horizon sun: bass-driven disc with glow
        let sun_radius = frame.height * (0.1 + bass * 0.1);
        canvas.fill_circle(vanish.x, horizon_y - sun_radius * 0.3, sun_radius, sun_color, 0.9);
        if frame.settings.glow {
            canvas.glow_circle(
                vanish.x,
                horizon_y - sun_radius * 0.3,
                sun_radius * (1.8 + bass),
                sun_color,
                0.2,
            );
        }

        // Verticals fan out from the vanishing point to the bottom edge
        for i in 0..self.verticals {
            let t = i as f32 / (self.verticals - 1).max(1) as f32;
            let bottom_x = (t - 0.5) * frame.width * 2.4 + frame.width * 0.5;
            canvas.stroke_line(
                vanish,
                Vec2::new(bottom_x, frame.height),
                line_width,
                grid_color,
                0.5,
            );
        }

        // Horizontals scroll toward the viewer; the rotation phase drives a
        // repeating depth offset
        let scroll = (frame.rotation * 3.0 * frame.settings.speed).fract();
        for row in 0..SCROLL_ROWS {
            let depth = (row as f32 + scroll) / SCROLL_ROWS as f32;
            // Perspective: rows crowd toward the horizon
            let y = horizon_y + (frame.height - horizon_y) * depth * depth;
            let alpha = 0.15 + depth * (0.5 + mid * 0.4);
            canvas.stroke_line(
                Vec2::new(0.0, y),
                Vec2::new(frame.width, y),
                line_width * (0.5 + depth),
                grid_color,
                alpha.min(1.0),
            );
        }

        // Horizon line seals the seam
        canvas.stroke_line(
            Vec2::new(0.0, horizon_y),
            Vec2::new(frame.width, horizon_y),
            1.5,
            grid_color,
            0.8,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings};

    #[test]
    fn test_width_boost_spikes_and_decays() {
        let mut synth = Synthwave::new();
        synth.init(128.0, 72.0, Quality::Med);
        let mut surface = Surface::new(128, 72, 1.0).unwrap();
        let palette = PalettePreset::Sunset.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![90.0f32; 64];

        let mut draw = |synth: &mut Synthwave, beat: bool, rotation: f32| {
            let input = FrameInput {
                spectrum: &spectrum,
                alt_spectrum: None,
                width: 128.0,
                height: 72.0,
                palette: &palette,
                settings: &settings,
                rotation,
                beat,
            };
            synth.draw(&mut surface.canvas(), &input);
        };

        draw(&mut synth, true, 0.0);
        assert_eq!(synth.width_boost, 1.0);
        for f in 1..=90 {
            draw(&mut synth, false, f as f32 * 0.005);
        }
        assert!(synth.width_boost < 0.01, "boost decays away");
    }
}
