//! Drifting blobs with treble-triggered spark streaks.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use rand::{Rng, RngExt};
use waveflow_core::Quality;

const BASE_BLOBS: usize = 5;
const MAX_SPARKS: usize = 40;
/// Critically-damped drift factor toward the band-driven target
const DRIFT: f32 = 0.05;
const SPARK_DECAY: f32 = 0.04;
const TREBLE_SPARK_THRESHOLD: f32 = 0.55;

struct Blob {
    pos: Vec2,
    target: Vec2,
    radius: f32,
    color_index: usize,
}

struct Spark {
    pos: Vec2,
    vel: Vec2,
    alpha: f32,
    color_index: usize,
}

/// Plasma: blobs ease toward bass/mid-driven anchor points; treble spikes
/// and beats throw short-lived directional sparks off a random blob.
pub struct Plasma {
    blobs: Vec<Blob>,
    sparks: Vec<Spark>,
    blob_count: usize,
}

impl Plasma {
    /// Create an uninitialized plasma field
    pub fn new() -> Self {
        Self {
            blobs: Vec::new(),
            sparks: Vec::new(),
            blob_count: 0,
        }
    }

    fn spawn_spark(&mut self, rng: &mut impl Rng) {
        if self.blobs.is_empty() {
            return;
        }
        let blob = &self.blobs[rng.random_range(0..self.blobs.len())];
        let spark = Spark {
            pos: blob.pos,
            vel: Vec2::new(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0)),
            alpha: 1.0,
            color_index: blob.color_index,
        };
        // Reuse a dead slot; skip the spawn when the pool is saturated
        if let Some(dead) = self.sparks.iter_mut().find(|s| s.alpha <= 0.0) {
            *dead = spark;
        } else if self.sparks.len() < MAX_SPARKS {
            self.sparks.push(spark);
        }
    }

    #[cfg(test)]
    fn spark_len(&self) -> usize {
        self.sparks.len()
    }
}

impl Default for Plasma {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Plasma {
    fn name(&self) -> &'static str {
        "plasma"
    }

    fn init(&mut self, width: f32, height: f32, quality: Quality) {
        let mut rng = rand::rng();
        self.blob_count = quality.scale_count(BASE_BLOBS);
        self.sparks.clear();
        self.blobs = (0..self.blob_count)
            .map(|i| {
                let pos = Vec2::new(
                    rng.random_range(0.0..width.max(1.0)),
                    rng.random_range(0.0..height.max(1.0)),
                );
                Blob {
                    pos,
                    target: pos,
                    radius: rng.random_range(20.0..60.0),
                    color_index: i,
                }
            })
            .collect();
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.palette.is_empty() || self.blobs.is_empty() {
            return;
        }
        let mut rng = rand::rng();
        let bass = frame.bass();
        let mid = frame.mid();
        let treble = frame.treble();
        let center = Vec2::new(frame.width * 0.5, frame.height * 0.5);

        for (i, blob) in self.blobs.iter_mut().enumerate() {
            // Anchor points orbit the center, radius swelling with bass
            let angle = frame.rotation * (1.0 + i as f32 * 0.3) + i as f32 * 2.1;
            let reach = frame.width.min(frame.height) * (0.15 + bass * 0.3 + mid * 0.1);
            blob.target = center + Vec2::new(angle.cos(), angle.sin()) * reach;
            blob.pos += (blob.target - blob.pos) * DRIFT * frame.settings.speed;

            let Some(color) = frame.palette.cycle(blob.color_index) else { continue };
            let radius = blob.radius * (0.7 + bass * 0.6);
            canvas.fill_circle(blob.pos.x, blob.pos.y, radius * 0.45, color, 0.7);
            if frame.settings.glow {
                canvas.glow_circle(blob.pos.x, blob.pos.y, radius, color, 0.18);
            }
        }

        if frame.beat || treble > TREBLE_SPARK_THRESHOLD {
            let burst = if frame.beat { 4 } else { 1 };
            for _ in 0..burst {
                self.spawn_spark(&mut rng);
            }
        }

        for spark in &mut self.sparks {
            if spark.alpha <= 0.0 {
                continue;
            }
            let from = spark.pos;
            spark.pos += spark.vel * frame.settings.speed;
            // Linear decay; dead sparks stay in the pool for reuse
            spark.alpha -= SPARK_DECAY * frame.settings.speed;
            if let Some(color) = frame.palette.cycle(spark.color_index) {
                canvas.stroke_line(from, spark.pos, 1.5, color, spark.alpha.max(0.0));
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
    fn test_spark_pool_never_exceeds_cap() {
        let mut plasma = Plasma::new();
        plasma.init(120.0, 80.0, Quality::High);
        let mut surface = Surface::new(120, 80, 1.0).unwrap();
        let palette = PalettePreset::Neon.palette();
        let settings = VisualizerSettings::default();
        // All-loud spectrum keeps treble above the spark threshold
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
                beat: i % 10 == 0,
            };
            plasma.draw(&mut surface.canvas(), &input);
            assert!(plasma.spark_len() <= MAX_SPARKS);
        }
    }

    #[test]
    fn test_blobs_converge_toward_targets() {
        let mut plasma = Plasma::new();
        plasma.init(200.0, 200.0, Quality::Low);
        let mut surface = Surface::new(200, 200, 1.0).unwrap();
        let palette = PalettePreset::Neon.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![0.0f32; 64];

        // With zero energy and a fixed rotation the target is static, so the
        // blob distance to it must shrink
        let input = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 200.0,
            height: 200.0,
            palette: &palette,
            settings: &settings,
            rotation: 1.0,
            beat: false,
        };
        plasma.draw(&mut surface.canvas(), &input);
        let d0 = plasma.blobs[0].pos.distance(plasma.blobs[0].target);
        for _ in 0..30 {
            plasma.draw(&mut surface.canvas(), &input);
        }
        let d1 = plasma.blobs[0].pos.distance(plasma.blobs[0].target);
        assert!(d1 <= d0 + 1e-3, "blob should approach its target: {} -> {}", d0, d1);
    }
}
