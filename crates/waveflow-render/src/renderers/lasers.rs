//! Rotating laser sweeps with beat strobes.

use crate::renderer::{FrameInput, Renderer};
use crate::renderers::polar;
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::{DynamicPeakLimiter, Quality};

const BASE_BEAMS: usize = 10;
const STROBE_DECAY: f32 = 0.12;

/// Beams sweep around the center; band energy sets beam reach and
/// brightness, beats fire a white strobe that decays over a few frames.
/// A peak limiter tames the bass drive so sustained loud passages do not
/// pin every beam at full reach.
pub struct Lasers {
    beam_count: usize,
    strobe: f32,
    limiter: DynamicPeakLimiter,
}

impl Lasers {
    /// Create an uninitialized sweep
    pub fn new() -> Self {
        Self {
            beam_count: 0,
            strobe: 0.0,
            limiter: DynamicPeakLimiter::new(),
        }
    }
}

impl Default for Lasers {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Lasers {
    fn name(&self) -> &'static str {
        "lasers"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.beam_count = quality.scale_count(BASE_BEAMS);
        self.strobe = 0.0;
        self.limiter = DynamicPeakLimiter::new();
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.beam_count == 0 {
            return;
        }

        if frame.beat {
            self.strobe = 1.0;
        }

        let center = Vec2::new(frame.width * 0.5, frame.height * 0.55);
        let max_reach = frame.width.max(frame.height) * 0.75;
        // Limited drive: gain drops under sustained loudness and recovers
        let raw_bass = frame.bass();
        let bass = (raw_bass * self.limiter.process(raw_bass)).clamp(0.0, 1.0);
        let treble = frame.treble();

        for i in 0..self.beam_count {
            let slot = i as f32 / self.beam_count as f32;
            // Beams fan out and counter-rotate in two groups
            let dir = if i % 2 == 0 { 1.0 } else { -1.3 };
            let angle = frame.rotation * dir * 2.0 + slot * std::f32::consts::TAU;
            let band = (slot, (slot + 1.0 / self.beam_count as f32).min(1.0));
            let energy = frame.level(band.0, band.1);

            let Some(color) = frame.palette.cycle(i) else { continue };
            let reach = max_reach * (0.35 + energy * 0.65 + bass * 0.15);
            let tip = polar(center, angle, reach);
            let alpha = 0.25 + energy * 0.6 + self.strobe * 0.15;
            let width = 1.5 + energy * 3.0 + treble * 1.5;

            canvas.stroke_line(center, tip, width, color, alpha.min(1.0));
            if frame.settings.glow {
                canvas.stroke_line(center, tip, width * 3.0, color, alpha * 0.15);
            }
        }

        if self.strobe > 0.0 {
            // Whole-field strobe overlay
            canvas.fill_rect(
                0.0,
                0.0,
                frame.width,
                frame.height,
                waveflow_core::Rgb::new(255, 255, 255),
                self.strobe * 0.18,
            );
            self.strobe = (self.strobe - STROBE_DECAY * frame.settings.speed).max(0.0);
        }
    }
}
