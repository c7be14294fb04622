//! Concentric arc stack with a beat-triggered scale pulse.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use waveflow_core::{band_level, Quality};

const BASE_RINGS: usize = 8;
const BEAT_PULSE: f32 = 1.25;
/// Pulse eases back toward 1.0 at this rate per frame
const PULSE_EASE: f32 = 0.1;

/// Concentric arcs, each bound to a percentile slice of the spectrum;
/// beats pulse the whole stack outward and it eases back.
pub struct RingStack {
    ring_count: usize,
    scale: f32,
}

impl RingStack {
    /// Create an uninitialized ring stack
    pub fn new() -> Self {
        Self {
            ring_count: 0,
            scale: 1.0,
        }
    }

    /// Current pulse scale; 1.0 at rest
    pub fn pulse_scale(&self) -> f32 {
        self.scale
    }
}

impl Default for RingStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for RingStack {
    fn name(&self) -> &'static str {
        "rings"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.ring_count = quality.scale_count(BASE_RINGS);
        self.scale = 1.0;
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.ring_count == 0 {
            return;
        }

        if frame.beat {
            self.scale = BEAT_PULSE;
        } else {
            self.scale += (1.0 - self.scale) * PULSE_EASE;
        }

        let cx = frame.width * 0.5;
        let cy = frame.height * 0.5;
        let max_radius = frame.width.min(frame.height) * 0.42;

        for i in 0..self.ring_count {
            let lo = i as f32 / self.ring_count as f32;
            let hi = (i + 1) as f32 / self.ring_count as f32;
            let energy =
                (band_level(frame.spectrum, lo, hi) * frame.settings.sensitivity).clamp(0.0, 1.0);

            let Some(color) = frame.palette.cycle(i) else { continue };
            let radius =
                max_radius * (0.2 + 0.8 * hi) * (1.0 + energy * 0.25) * self.scale;
            let width = 1.0 + energy * 6.0;
            // Each ring spins opposite its neighbors; arcs leave a gap so
            // the rotation reads
            let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
            let start = frame.rotation * dir * (1.0 + i as f32 * 0.15);
            let sweep = std::f32::consts::TAU * (0.55 + energy * 0.35);
            let alpha = 0.35 + energy * 0.6;
            canvas.stroke_arc(cx, cy, radius, start, sweep, width, color, alpha);
            if frame.settings.glow && energy > 0.5 {
                canvas.stroke_arc(cx, cy, radius, start, sweep, width * 2.5, color, alpha * 0.2);
            }
        }
    }
}
