//! Dual-channel bar field with decaying peak markers.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use waveflow_core::{average, soft_compress, Quality, SPECTRUM_MAX};

const BASE_BARS: usize = 56;
/// Power-law exponent for the bin partition; low frequencies get
/// proportionally more bars
const BIN_CURVE: f32 = 1.5;
/// Peak fall per frame as a fraction of surface height
const PEAK_FALL: f32 = 0.004;
const PEAK_MARKER_HEIGHT: f32 = 3.0;

/// Mirrored spectrum bars rising from the bottom edge, one peak marker per
/// bar. The left half reads the primary channel, the right half reads the
/// alternate channel when present.
pub struct BarField {
    peaks: Vec<f32>,
    bar_count: usize,
}

impl BarField {
    /// Create an uninitialized bar field
    pub fn new() -> Self {
        Self {
            peaks: Vec::new(),
            bar_count: 0,
        }
    }

    fn bar_value(spectrum: &[f32], index: usize, count: usize, sensitivity: f32) -> f32 {
        let bins = spectrum.len() as f32;
        let t0 = (index as f32 / count as f32).powf(BIN_CURVE);
        let t1 = ((index + 1) as f32 / count as f32).powf(BIN_CURVE);
        let start = (t0 * bins) as usize;
        let end = ((t1 * bins) as usize).max(start + 1);
        let raw = average(spectrum, start, end) / SPECTRUM_MAX * sensitivity;
        soft_compress(raw, 0.8)
    }
}

impl Default for BarField {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BarField {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.bar_count = quality.scale_count(BASE_BARS);
        self.peaks = vec![0.0; self.bar_count];
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.bar_count == 0 {
            return;
        }

        let half_w = frame.width * 0.5;
        let bar_w = half_w / self.bar_count as f32;
        let max_h = frame.height * 0.92;
        let fall = frame.height * PEAK_FALL * frame.settings.sensitivity.max(0.25);
        let right_channel = frame.alt_spectrum.unwrap_or(frame.spectrum);

        for i in 0..self.bar_count {
            let left_v = Self::bar_value(
                frame.spectrum,
                i,
                self.bar_count,
                frame.settings.sensitivity,
            );
            let right_v =
                Self::bar_value(right_channel, i, self.bar_count, frame.settings.sensitivity);

            let Some(color) = frame.palette.cycle(i) else { return };
            let gap = bar_w * 0.15;

            // Bar i sits i slots out from the center on both sides
            let left_x = half_w - (i + 1) as f32 * bar_w;
            let right_x = half_w + i as f32 * bar_w;
            let left_h = left_v * max_h;
            let right_h = right_v * max_h;

            canvas.fill_rect(
                left_x + gap,
                frame.height - left_h,
                bar_w - gap * 2.0,
                left_h,
                color,
                0.9,
            );
            canvas.fill_rect(
                right_x + gap,
                frame.height - right_h,
                bar_w - gap * 2.0,
                right_h,
                color,
                0.9,
            );

            // Peak marker: rises instantly, falls at a height-scaled rate
            let bar_h = left_h.max(right_h);
            if bar_h > self.peaks[i] {
                self.peaks[i] = bar_h;
            } else {
                self.peaks[i] = (self.peaks[i] - fall).max(0.0);
            }
            let peak_y = frame.height - self.peaks[i] - PEAK_MARKER_HEIGHT;
            canvas.fill_rect(left_x + gap, peak_y, bar_w - gap * 2.0, PEAK_MARKER_HEIGHT, color, 1.0);
            canvas.fill_rect(right_x + gap, peak_y, bar_w - gap * 2.0, PEAK_MARKER_HEIGHT, color, 1.0);

            if frame.settings.glow && bar_h > max_h * 0.6 {
                canvas.glow_circle(
                    left_x + bar_w * 0.5,
                    frame.height - left_h,
                    bar_w,
                    color,
                    0.25,
                );
                canvas.glow_circle(
                    right_x + bar_w * 0.5,
                    frame.height - right_h,
                    bar_w,
                    color,
                    0.25,
                );
            }
        }
    }
}
