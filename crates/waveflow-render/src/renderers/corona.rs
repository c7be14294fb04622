//! Eclipse disc with band-driven corona streamers.

use crate::renderer::{FrameInput, Renderer};
use crate::renderers::polar;
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::{Quality, Rgb};

const BASE_STREAMERS: usize = 48;
const FLARE_DECAY: f32 = 0.08;

/// A dark occluding disc ringed by streamers whose length follows the
/// spectrum slice behind each ray; beats fire a corona flare.
pub struct Corona {
    streamers: usize,
    flare: f32,
}

impl Corona {
    /// Create an uninitialized corona
    pub fn new() -> Self {
        Self {
            streamers: 0,
            flare: 0.0,
        }
    }
}

impl Default for Corona {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Corona {
    fn name(&self) -> &'static str {
        "corona"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.streamers = quality.scale_count(BASE_STREAMERS);
        self.flare = 0.0;
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.streamers == 0 {
            return;
        }

        if frame.beat {
            self.flare = 1.0;
        } else {
            self.flare = (self.flare - FLARE_DECAY * frame.settings.speed).max(0.0);
        }

        let center = Vec2::new(frame.width * 0.5, frame.height * 0.5);
        let disc_radius = frame.width.min(frame.height) * 0.18;
        let max_reach = frame.width.min(frame.height) * 0.32;
        let bass = frame.bass();

        // Streamers first; the disc occludes their roots
        for i in 0..self.streamers {
            let t = i as f32 / self.streamers as f32;
            let angle = t * std::f32::consts::TAU + frame.rotation * 0.3;
            let energy = frame.level(t, t + 1.0 / self.streamers as f32);
            // Phase jitter keeps rays from pulsing in lockstep
            let shimmer = ((frame.rotation * 2.0 + i as f32 * 1.7).sin() * 0.5 + 0.5) * 0.3;

            let Some(color) = frame.palette.cycle(i) else { continue };
            let reach = disc_radius + max_reach * (0.15 + energy * 0.7 + shimmer + self.flare * 0.4);
            let root = polar(center, angle, disc_radius * 0.9);
            let tip = polar(center, angle, reach);
            let alpha = 0.25 + energy * 0.55 + self.flare * 0.2;
            canvas.stroke_line(root, tip, 1.2 + energy * 2.0, color, alpha.min(1.0));
        }

        // Rim glow between streamers and disc
        let rim = frame.palette.cycle(0).unwrap_or(Rgb::new(255, 234, 0));
        if frame.settings.glow {
            canvas.glow_circle(
                center.x,
                center.y,
                disc_radius * (1.25 + bass * 0.3 + self.flare * 0.4),
                rim,
                0.3 + self.flare * 0.3,
            );
        }
        canvas.stroke_circle(center.x, center.y, disc_radius * 1.02, 2.0, rim, 0.8);

        // Eclipse disc
        canvas.fill_circle(center.x, center.y, disc_radius, Rgb::new(0, 0, 0), 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings};

    #[test]
    fn test_flare_decays_after_beat() {
        let mut corona = Corona::new();
        corona.init(100.0, 100.0, Quality::Med);
        let mut surface = Surface::new(100, 100, 1.0).unwrap();
        let palette = PalettePreset::Sunset.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![120.0f32; 64];

        let mut draw = |corona: &mut Corona, beat: bool| {
            let input = FrameInput {
                spectrum: &spectrum,
                alt_spectrum: None,
                width: 100.0,
                height: 100.0,
                palette: &palette,
                settings: &settings,
                rotation: 0.5,
                beat,
            };
            corona.draw(&mut surface.canvas(), &input);
        };

        draw(&mut corona, true);
        assert_eq!(corona.flare, 1.0);
        for _ in 0..30 {
            draw(&mut corona, false);
        }
        assert_eq!(corona.flare, 0.0);
    }

    #[test]
    fn test_disc_center_is_black() {
        let mut corona = Corona::new();
        corona.init(100.0, 100.0, Quality::High);
        let mut surface = Surface::new(100, 100, 1.0).unwrap();
        surface.clear(false);
        let palette = PalettePreset::Sunset.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![200.0f32; 64];
        let input = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 100.0,
            height: 100.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.0,
            beat: false,
        };
        corona.draw(&mut surface.canvas(), &input);
        let px = surface.pixmap().pixel(50, 50).unwrap();
        assert!(px.red() < 10 && px.green() < 10 && px.blue() < 10);
    }
}
