//! Rising soft-body sprites with a volume-preserving wobble.

use crate::renderer::{FrameInput, Renderer};
use crate::sprite::{SpriteCache, SpriteKey, SpriteKind};
use crate::surface::Canvas;
use glam::Vec2;
use rand::{Rng, RngExt};
use waveflow_core::Quality;

const BASE_BUBBLES: usize = 64;
/// Frames over which a newly spawned bubble fades in
const FADE_IN_FRAMES: f32 = 30.0;
const BASE_RISE: f32 = 0.35;
const BASS_LIFT: f32 = 1.6;

struct Bubble {
    pos: Vec2,
    radius: f32,
    wobble_phase: f32,
    wobble_speed: f32,
    rise: f32,
    age: f32,
    color_index: usize,
}

/// Bubbles drift upward with bass-driven lift; each oscillates between a
/// wide-flat and tall-thin shape so the apparent volume stays constant.
pub struct Bubbles {
    pool: Vec<Bubble>,
    sprites: SpriteCache,
    target_count: usize,
    width: f32,
    height: f32,
}

impl Bubbles {
    /// Create an uninitialized bubble field
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            sprites: SpriteCache::new(),
            target_count: 0,
            width: 0.0,
            height: 0.0,
        }
    }

    fn spawn(&self, rng: &mut impl Rng, at_bottom: bool) -> Bubble {
        Bubble {
            pos: Vec2::new(
                rng.random_range(0.0..self.width.max(1.0)),
                if at_bottom {
                    self.height + rng.random_range(5.0..40.0)
                } else {
                    rng.random_range(0.0..self.height.max(1.0))
                },
            ),
            radius: rng.random_range(4.0..16.0),
            wobble_phase: rng.random_range(0.0..std::f32::consts::TAU),
            wobble_speed: rng.random_range(0.05..0.14),
            rise: rng.random_range(0.6..1.4),
            age: 0.0,
            color_index: rng.random_range(0..64),
        }
    }

    #[cfg(test)]
    fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

impl Default for Bubbles {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Bubbles {
    fn name(&self) -> &'static str {
        "bubbles"
    }

    fn init(&mut self, width: f32, height: f32, quality: Quality) {
        let mut rng = rand::rng();
        self.width = width;
        self.height = height;
        self.target_count = quality.scale_count(BASE_BUBBLES);
        self.sprites.clear();
        self.pool.clear();
        for _ in 0..self.target_count {
            let bubble = self.spawn(&mut rng, false);
            self.pool.push(bubble);
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.palette.is_empty() || self.pool.is_empty() {
            return;
        }
        let mut rng = rand::rng();
        let bass = frame.bass();
        let speed = frame.settings.speed;

        for i in 0..self.pool.len() {
            let bubble = &mut self.pool[i];
            bubble.age += 1.0;
            bubble.wobble_phase += bubble.wobble_speed * speed;
            bubble.pos.y -= (BASE_RISE + bass * BASS_LIFT) * bubble.rise * speed;
            bubble.pos.x += bubble.wobble_phase.cos() * 0.3;

            if bubble.pos.y < -bubble.radius * 2.0 {
                // Recycled bubbles reappear at the bottom fully opaque
                let mut fresh = self.spawn(&mut rng, true);
                fresh.age = FADE_IN_FRAMES;
                self.pool[i] = fresh;
                continue;
            }

            let Some(color) = frame.palette.cycle(bubble.color_index) else { continue };
            let alpha = (bubble.age / FADE_IN_FRAMES).min(1.0) * 0.85;
            let wobble = bubble.wobble_phase.sin() * 0.15;
            let scale = bubble.radius * 2.0 / crate::sprite::SPRITE_SIZE as f32;
            let (cx, cy) = (bubble.pos.x, bubble.pos.y);
            let (sx, sy) = (scale * (1.0 + wobble), scale * (1.0 - wobble));

            let kind = if frame.settings.glow { SpriteKind::Soft } else { SpriteKind::Hard };
            let sprite = self.sprites.get_or_render(SpriteKey { color, kind });
            canvas.draw_sprite(sprite.as_ref(), cx, cy, sx, sy, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings};

    #[test]
    fn test_pool_and_sprite_cache_stay_bounded() {
        for quality in [Quality::Low, Quality::Med, Quality::High] {
            let mut bubbles = Bubbles::new();
            bubbles.init(120.0, 80.0, quality);
            let cap = quality.scale_count(BASE_BUBBLES);

            let mut surface = Surface::new(120, 80, 1.0).unwrap();
            let palette = PalettePreset::Ocean.palette();
            let settings = VisualizerSettings::default();
            let spectrum = vec![200.0f32; 64];

            for i in 0..10_000 {
                let input = FrameInput {
                    spectrum: &spectrum,
                    alt_spectrum: None,
                    width: 120.0,
                    height: 80.0,
                    palette: &palette,
                    settings: &settings,
                    rotation: i as f32 * 0.005,
                    beat: false,
                };
                bubbles.draw(&mut surface.canvas(), &input);
                assert!(bubbles.pool_len() <= cap);
                assert!(bubbles.sprites.len() <= crate::sprite::MAX_SPRITES);
            }
        }
    }

    #[test]
    fn test_recycled_bubbles_skip_fade_in() {
        let mut bubbles = Bubbles::new();
        bubbles.init(100.0, 50.0, Quality::Low);
        // Force everything above the top edge
        for bubble in &mut bubbles.pool {
            bubble.pos.y = -100.0;
        }
        let mut surface = Surface::new(100, 50, 1.0).unwrap();
        let palette = PalettePreset::Ocean.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![0.0f32; 64];
        let input = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 100.0,
            height: 50.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.0,
            beat: false,
        };
        bubbles.draw(&mut surface.canvas(), &input);
        for bubble in &bubbles.pool {
            assert!(bubble.age >= FADE_IN_FRAMES, "recycled bubble must be opaque");
            assert!(bubble.pos.y > 0.0, "recycled bubble restarts at the bottom");
        }
    }
}
