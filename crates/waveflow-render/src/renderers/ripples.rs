//! Radial ripple rings with a reuse-or-skip spawn pool.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use rand::{Rng, RngExt};
use waveflow_core::Quality;

const MAX_RIPPLES: usize = 24;
const BASS_SPAWN_THRESHOLD: f32 = 0.6;
const GROWTH: f32 = 2.2;

struct Ripple {
    pos: Vec2,
    radius: f32,
    max_radius: f32,
    alpha: f32,
    color_index: usize,
}

/// Expanding echo rings; beats spawn a small burst, strong bass trickles
/// singles. Dead slots are reused and spawns are skipped when the pool is
/// saturated.
pub struct Ripples {
    pool: Vec<Ripple>,
    pool_cap: usize,
}

impl Ripples {
    /// Create an uninitialized ripple field
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            pool_cap: 0,
        }
    }

    fn spawn(&mut self, rng: &mut impl Rng, width: f32, height: f32) {
        let ripple = Ripple {
            pos: Vec2::new(
                rng.random_range(width * 0.2..width * 0.8),
                rng.random_range(height * 0.2..height * 0.8),
            ),
            radius: 2.0,
            // Lower bound keeps the range non-empty on tiny surfaces
            max_radius: rng.random_range(30.0..(width * 0.5).max(40.0)),
            alpha: 1.0,
            color_index: rng.random_range(0..64),
        };
        if let Some(dead) = self.pool.iter_mut().find(|r| r.alpha <= 0.0) {
            *dead = ripple;
        } else if self.pool.len() < self.pool_cap {
            self.pool.push(ripple);
        }
        // Saturated pool: skip the spawn
    }

    #[cfg(test)]
    fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

impl Default for Ripples {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Ripples {
    fn name(&self) -> &'static str {
        "ripples"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.pool_cap = quality.scale_count(MAX_RIPPLES);
        self.pool.clear();
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.palette.is_empty() || self.pool_cap == 0 {
            return;
        }
        let mut rng = rand::rng();
        let bass = frame.bass();

        if frame.beat {
            for _ in 0..3 {
                self.spawn(&mut rng, frame.width, frame.height);
            }
        } else if bass > BASS_SPAWN_THRESHOLD && rng.random::<f32>() < 0.2 {
            self.spawn(&mut rng, frame.width, frame.height);
        }

        for ripple in &mut self.pool {
            if ripple.alpha <= 0.0 {
                continue;
            }
            ripple.radius += GROWTH * frame.settings.speed * (0.6 + bass);
            // Alpha follows remaining headroom so rings fade as they grow
            ripple.alpha = (1.0 - ripple.radius / ripple.max_radius).max(0.0);
            if ripple.alpha <= 0.0 {
                continue;
            }
            let Some(color) = frame.palette.cycle(ripple.color_index) else { continue };
            let width = 1.0 + ripple.alpha * 3.0;
            canvas.stroke_circle(ripple.pos.x, ripple.pos.y, ripple.radius, width, color, ripple.alpha);
            if frame.settings.glow {
                canvas.stroke_circle(
                    ripple.pos.x,
                    ripple.pos.y,
                    ripple.radius,
                    width * 3.0,
                    color,
                    ripple.alpha * 0.15,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings, SPECTRUM_MAX};

    #[test]
    fn test_pool_respects_cap_under_constant_beats() {
        for quality in [Quality::Low, Quality::Med, Quality::High] {
            let mut ripples = Ripples::new();
            ripples.init(120.0, 80.0, quality);
            let cap = quality.scale_count(MAX_RIPPLES);

            let mut surface = Surface::new(120, 80, 1.0).unwrap();
            let palette = PalettePreset::Neon.palette();
            let settings = VisualizerSettings::default();
            let spectrum = vec![SPECTRUM_MAX; 64];

            for i in 0..10_000 {
                let input = FrameInput {
                    spectrum: &spectrum,
                    alt_spectrum: None,
                    width: 120.0,
                    height: 80.0,
                    palette: &palette,
                    settings: &settings,
                    rotation: i as f32 * 0.005,
                    beat: true,
                };
                ripples.draw(&mut surface.canvas(), &input);
                assert!(ripples.pool_len() <= cap);
            }
        }
    }

    #[test]
    fn test_rings_fade_out_completely() {
        let mut ripples = Ripples::new();
        ripples.init(100.0, 100.0, Quality::Low);
        let mut surface = Surface::new(100, 100, 1.0).unwrap();
        let palette = PalettePreset::Neon.palette();
        let settings = VisualizerSettings::default();
        let quiet = vec![0.0f32; 64];

        // One beat, then silence: every ring eventually dies
        let mut beat = true;
        for i in 0..400 {
            let input = FrameInput {
                spectrum: &quiet,
                alt_spectrum: None,
                width: 100.0,
                height: 100.0,
                palette: &palette,
                settings: &settings,
                rotation: i as f32 * 0.005,
                beat,
            };
            ripples.draw(&mut surface.canvas(), &input);
            beat = false;
        }
        assert!(ripples.pool.iter().all(|r| r.alpha <= 0.0));
    }
}
