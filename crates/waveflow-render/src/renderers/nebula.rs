//! Drifting attractor clusters with orbiting particles.

use crate::renderer::{FrameInput, Renderer};
use crate::renderers::polar;
use crate::surface::Canvas;
use glam::Vec2;
use rand::{Rng, RngExt};
use waveflow_core::{Quality, Rgb};

const BASE_PARTICLES: usize = 220;
const CLUSTER_COUNT: usize = 3;
/// Fraction of the pool left unattached, drifting freely
const WANDERER_FRACTION: f32 = 0.18;
const FLASH_DECAY: f32 = 0.06;

struct Cluster {
    pos: Vec2,
    vel: Vec2,
}

struct Mote {
    /// Index of the attractor, or None for a wanderer
    cluster: Option<usize>,
    pos: Vec2,
    drift: Vec2,
    angle: f32,
    angular_vel: f32,
    radius: f32,
    life: f32,
    max_life: f32,
    color_index: usize,
}

/// Nebula: most particles orbit the nearest of a few drifting clusters, a
/// minority wander free. Beats flash the field and nudge one cluster.
pub struct Nebula {
    clusters: Vec<Cluster>,
    motes: Vec<Mote>,
    target_count: usize,
    flash: f32,
    width: f32,
    height: f32,
}

impl Nebula {
    /// Create an uninitialized nebula
    pub fn new() -> Self {
        Self {
            clusters: Vec::new(),
            motes: Vec::new(),
            target_count: 0,
            flash: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    fn spawn_mote(&self, rng: &mut impl Rng) -> Mote {
        let wanderer = rng.random::<f32>() < WANDERER_FRACTION || self.clusters.is_empty();
        let max_life = rng.random_range(120.0..360.0);
        // Squared distribution concentrates density near cluster centers
        let r = rng.random::<f32>();
        let radius = r * r * self.width.min(self.height) * 0.25 + 4.0;
        Mote {
            cluster: if wanderer {
                None
            } else {
                Some(rng.random_range(0..self.clusters.len()))
            },
            pos: Vec2::new(
                rng.random_range(0.0..self.width.max(1.0)),
                rng.random_range(0.0..self.height.max(1.0)),
            ),
            drift: Vec2::new(rng.random_range(-0.4..0.4), rng.random_range(-0.4..0.4)),
            angle: rng.random_range(0.0..std::f32::consts::TAU),
            angular_vel: rng.random_range(0.004..0.02) * if rng.random::<bool>() { 1.0 } else { -1.0 },
            radius,
            life: max_life,
            max_life,
            color_index: rng.random_range(0..64),
        }
    }

    #[cfg(test)]
    fn pool_len(&self) -> usize {
        self.motes.len()
    }
}

impl Default for Nebula {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Nebula {
    fn name(&self) -> &'static str {
        "nebula"
    }

    fn init(&mut self, width: f32, height: f32, quality: Quality) {
        let mut rng = rand::rng();
        self.width = width;
        self.height = height;
        self.target_count = quality.scale_count(BASE_PARTICLES);
        self.flash = 0.0;
        self.clusters = (0..CLUSTER_COUNT)
            .map(|_| Cluster {
                pos: Vec2::new(
                    rng.random_range(width * 0.2..width * 0.8),
                    rng.random_range(height * 0.2..height * 0.8),
                ),
                vel: Vec2::new(rng.random_range(-0.3..0.3), rng.random_range(-0.3..0.3)),
            })
            .collect();
        self.motes.clear();
        for _ in 0..self.target_count {
            let mote = self.spawn_mote(&mut rng);
            self.motes.push(mote);
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.palette.is_empty() || self.motes.is_empty() {
            return;
        }
        let mut rng = rand::rng();
        let mid = frame.mid();
        let speed = frame.settings.speed;

        // Clusters drift and bounce softly off the edges
        for cluster in &mut self.clusters {
            cluster.pos += cluster.vel * speed;
            if cluster.pos.x < frame.width * 0.1 || cluster.pos.x > frame.width * 0.9 {
                cluster.vel.x = -cluster.vel.x;
            }
            if cluster.pos.y < frame.height * 0.1 || cluster.pos.y > frame.height * 0.9 {
                cluster.vel.y = -cluster.vel.y;
            }
        }

        if frame.beat {
            self.flash = 1.0;
            // Nudge one cluster so the field keeps evolving
            if !self.clusters.is_empty() {
                let idx = rng.random_range(0..self.clusters.len());
                self.clusters[idx].pos += Vec2::new(
                    rng.random_range(-30.0..30.0),
                    rng.random_range(-30.0..30.0),
                );
            }
        }

        for i in 0..self.motes.len() {
            let mote = &mut self.motes[i];
            mote.life -= speed;
            let expired = mote.life <= 0.0
                || mote.pos.x < -20.0
                || mote.pos.x > frame.width + 20.0
                || mote.pos.y < -20.0
                || mote.pos.y > frame.height + 20.0;
            if expired {
                // Recycle in place; the pool never grows
                let fresh = self.spawn_mote(&mut rng);
                self.motes[i] = fresh;
                continue;
            }

            match mote.cluster {
                Some(c) if c < self.clusters.len() => {
                    mote.angle += mote.angular_vel * (0.4 + mid * 1.6) * speed;
                    mote.pos = polar(self.clusters[c].pos, mote.angle, mote.radius);
                }
                _ => {
                    mote.pos += mote.drift * speed;
                }
            }

            let Some(color) = frame.palette.cycle(mote.color_index) else { continue };
            // Life envelope fades in and out
            let envelope = (mote.life / mote.max_life * std::f32::consts::PI).sin().max(0.0);
            let size = 1.2 + envelope * 1.8;
            canvas.fill_circle(mote.pos.x, mote.pos.y, size, color, envelope * 0.85);
            if frame.settings.glow && envelope > 0.6 {
                canvas.glow_circle(mote.pos.x, mote.pos.y, size * 3.0, color, envelope * 0.12);
            }
        }

        if self.flash > 0.0 {
            let color = frame.palette.cycle(0).unwrap_or(Rgb::new(255, 255, 255));
            canvas.glow_circle(
                frame.width * 0.5,
                frame.height * 0.5,
                frame.width.max(frame.height) * 0.5 * self.flash,
                color,
                self.flash * 0.25,
            );
            self.flash = (self.flash - FLASH_DECAY * speed).max(0.0);
        }
    }
}
