//! Bounded cache of pre-rendered particle sprites.
//!
//! Radial-gradient dots are expensive to rasterize per particle per frame;
//! renderers fetch them from this cache keyed by color and particle type.

use std::collections::HashMap;
use std::collections::VecDeque;
use tiny_skia::{
    FillRule, GradientStop, Paint, PathBuilder, Pixmap, Point, RadialGradient, SpreadMode,
    Transform,
};
use tracing::trace;
use waveflow_core::Rgb;

/// Sprite raster size in pixels (square)
pub const SPRITE_SIZE: u32 = 32;
/// Cache bound; inserting past this evicts the oldest entry
pub const MAX_SPRITES: usize = 48;

/// Particle sprite shape family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// Soft dot fading to transparent at the rim
    Soft,
    /// Solid core with a narrow falloff
    Hard,
}

/// Cache key: color plus particle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    /// Sprite tint
    pub color: Rgb,
    /// Shape family
    pub kind: SpriteKind,
}

/// Insertion-order-bounded sprite cache.
#[derive(Default)]
pub struct SpriteCache {
    entries: HashMap<SpriteKey, Pixmap>,
    order: VecDeque<SpriteKey>,
}

impl SpriteCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the sprite for `key`, rendering and caching it on a miss.
    ///
    /// A miss past the bound evicts the oldest-inserted entry first, so the
    /// cache never exceeds [`MAX_SPRITES`] entries.
    pub fn get_or_render(&mut self, key: SpriteKey) -> &Pixmap {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= MAX_SPRITES {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                    trace!("sprite cache evicted {:?}", oldest);
                } else {
                    break;
                }
            }
            self.entries.insert(key, render_sprite(key));
            self.order.push_back(key);
        }
        self.entries
            .get(&key)
            .expect("entry inserted above")
    }

    /// Number of cached sprites
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached sprite
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

fn render_sprite(key: SpriteKey) -> Pixmap {
    let mut pixmap = Pixmap::new(SPRITE_SIZE, SPRITE_SIZE)
        .expect("sprite dimensions are a nonzero constant");
    let center = SPRITE_SIZE as f32 * 0.5;
    let radius = center;

    let color = |alpha: f32| {
        tiny_skia::Color::from_rgba(
            key.color.r as f32 / 255.0,
            key.color.g as f32 / 255.0,
            key.color.b as f32 / 255.0,
            alpha,
        )
        .unwrap_or(tiny_skia::Color::WHITE)
    };
    let stops = match key.kind {
        SpriteKind::Soft => vec![
            GradientStop::new(0.0, color(1.0)),
            GradientStop::new(0.4, color(0.55)),
            GradientStop::new(1.0, color(0.0)),
        ],
        SpriteKind::Hard => vec![
            GradientStop::new(0.0, color(1.0)),
            GradientStop::new(0.8, color(0.9)),
            GradientStop::new(1.0, color(0.0)),
        ],
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    if let Some(shader) = RadialGradient::new(
        Point::from_xy(center, center),
        0.0,
        Point::from_xy(center, center),
        radius,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) {
        paint.shader = shader;
    }

    let mut pb = PathBuilder::new();
    pb.push_circle(center, center, radius);
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    pixmap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_does_not_grow() {
        let mut cache = SpriteCache::new();
        let key = SpriteKey {
            color: Rgb::new(255, 0, 0),
            kind: SpriteKind::Soft,
        };
        cache.get_or_render(key);
        cache.get_or_render(key);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_never_exceeds_bound() {
        let mut cache = SpriteCache::new();
        for i in 0..(MAX_SPRITES * 3) {
            let key = SpriteKey {
                color: Rgb::new((i % 256) as u8, (i / 256) as u8, 7),
                kind: if i % 2 == 0 { SpriteKind::Soft } else { SpriteKind::Hard },
            };
            cache.get_or_render(key);
            assert!(cache.len() <= MAX_SPRITES);
        }
        assert_eq!(cache.len(), MAX_SPRITES);
    }

    #[test]
    fn test_sprite_center_is_opaque_tinted() {
        let mut cache = SpriteCache::new();
        let key = SpriteKey {
            color: Rgb::new(0, 255, 0),
            kind: SpriteKind::Soft,
        };
        let sprite = cache.get_or_render(key);
        let center = sprite
            .pixel(SPRITE_SIZE / 2, SPRITE_SIZE / 2)
            .expect("center pixel exists");
        assert!(center.green() > 200);
        assert!(center.alpha() > 200);
    }
}
