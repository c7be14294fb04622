//! Perspective-projected starfield with energy-driven travel speed.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use rand::{Rng, RngExt};
use waveflow_core::Quality;

const BASE_STARS: usize = 180;
const FOV: f32 = 220.0;
const NEAR_PLANE: f32 = 2.0;
const FAR_PLANE: f32 = 320.0;
/// Screen-space streak length beyond which a segment is a wrap-around
/// artifact and is dropped
const MAX_STREAK: f32 = 90.0;
const BEAT_SURGE: f32 = 2.2;
const SURGE_DECAY: f32 = 0.92;

struct Star {
    angle: f32,
    radius: f32,
    z: f32,
    prev_screen: Option<Vec2>,
    color_index: usize,
}

/// Stars fly toward the viewer; bass and mid energy set the travel speed
/// and beats add a decaying surge.
pub struct Starfield {
    stars: Vec<Star>,
    surge: f32,
    target_count: usize,
}

impl Starfield {
    /// Create an uninitialized starfield
    pub fn new() -> Self {
        Self {
            stars: Vec::new(),
            surge: 1.0,
            target_count: 0,
        }
    }

    fn respawn(rng: &mut impl Rng, star: &mut Star) {
        star.angle = rng.random_range(0.0..std::f32::consts::TAU);
        star.radius = rng.random_range(4.0..160.0);
        star.z = rng.random_range(FAR_PLANE * 0.6..FAR_PLANE);
        star.prev_screen = None;
        star.color_index = rng.random_range(0..64);
    }

    #[cfg(test)]
    fn pool_len(&self) -> usize {
        self.stars.len()
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Starfield {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        let mut rng = rand::rng();
        self.target_count = quality.scale_count(BASE_STARS);
        self.surge = 1.0;
        self.stars = (0..self.target_count)
            .map(|_| {
                let mut star = Star {
                    angle: 0.0,
                    radius: 0.0,
                    z: 0.0,
                    prev_screen: None,
                    color_index: 0,
                };
                Self::respawn(&mut rng, &mut star);
                // Scatter the initial depth so stars don't arrive in a wave
                star.z = rng.random_range(NEAR_PLANE + 1.0..FAR_PLANE);
                star
            })
            .collect();
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.palette.is_empty() || self.stars.is_empty() {
            return;
        }
        let mut rng = rand::rng();
        let center = Vec2::new(frame.width * 0.5, frame.height * 0.5);

        if frame.beat {
            self.surge = BEAT_SURGE;
        } else {
            // Ease the surge back toward neutral
            self.surge = 1.0 + (self.surge - 1.0) * SURGE_DECAY;
        }

        let travel =
            (0.8 + frame.bass() * 2.4 + frame.mid() * 1.2) * self.surge * frame.settings.speed;

        for star in &mut self.stars {
            star.z -= travel;
            if star.z < NEAR_PLANE {
                Self::respawn(&mut rng, star);
            }

            let scale = FOV / star.z;
            let screen = center + Vec2::new(star.angle.cos(), star.angle.sin()) * star.radius * scale;
            let Some(color) = frame.palette.cycle(star.color_index) else { continue };
            let brightness = ((FAR_PLANE - star.z) / FAR_PLANE).clamp(0.1, 1.0);

            match star.prev_screen {
                // Streak only when the step is visually continuous
                Some(prev) if prev.distance(screen) < MAX_STREAK => {
                    canvas.stroke_line(prev, screen, (scale * 0.8).min(3.0), color, brightness);
                }
                _ => {
                    canvas.fill_circle(screen.x, screen.y, (scale * 0.5).min(2.5), color, brightness);
                }
            }
            star.prev_screen = Some(screen);
        }
    }
}
