//! Spectral-flux beat detection.

use std::collections::VecDeque;

/// Bins considered for flux; onsets live in the low end of the spectrum
const FLUX_BINS: usize = 60;
/// Flux history length, ~0.5s at 60 frames per second
const HISTORY_LEN: usize = 30;
/// Absolute flux floor below which nothing counts as a beat
const FLUX_FLOOR: f32 = 1500.0;
/// Flux must exceed the running mean by this ratio
const MEAN_RATIO: f32 = 1.35;
/// Debounce interval in seconds; caps detectable tempo at ~240 BPM
const MIN_BEAT_INTERVAL: f64 = 0.25;

/// Per-frame onset detector.
///
/// Flux is the sum of positive frame-to-frame magnitude increases over the
/// first 60 bins. A beat is reported when the flux clears both an absolute
/// floor and a multiple of its own recent mean, at most once per debounce
/// interval. The caller supplies a monotonic timestamp so the detector
/// stays replayable under a synthetic frame stream.
#[derive(Debug, Clone)]
pub struct BeatDetector {
    prev: Option<Vec<f32>>,
    flux_history: VecDeque<f32>,
    last_beat: f64,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self {
            prev: None,
            flux_history: VecDeque::with_capacity(HISTORY_LEN),
            last_beat: f64::NEG_INFINITY,
        }
    }
}

impl BeatDetector {
    /// Create an unseeded detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one spectrum snapshot; returns true when this frame is a beat.
    ///
    /// `now` is a monotonic timestamp in seconds. The snapshot is always
    /// stored for the next comparison, whatever the outcome.
    pub fn update(&mut self, spectrum: &[f32], now: f64) -> bool {
        let Some(prev) = &self.prev else {
            // Unseeded: nothing to compare against yet
            self.prev = Some(spectrum.to_vec());
            return false;
        };

        let bins = FLUX_BINS.min(spectrum.len()).min(prev.len());
        let mut flux = 0.0f32;
        for i in 0..bins {
            let delta = spectrum[i] - prev[i];
            if delta > 0.0 && delta.is_finite() {
                flux += delta;
            }
        }

        if self.flux_history.len() >= HISTORY_LEN {
            self.flux_history.pop_front();
        }
        self.flux_history.push_back(flux);

        let mean = self.flux_history.iter().sum::<f32>() / self.flux_history.len() as f32;

        let is_beat = flux > FLUX_FLOOR
            && flux > mean * MEAN_RATIO
            && now - self.last_beat >= MIN_BEAT_INTERVAL;
        if is_beat {
            self.last_beat = now;
        }

        match &mut self.prev {
            Some(stored) => {
                stored.clear();
                stored.extend_from_slice(spectrum);
            }
            None => self.prev = Some(spectrum.to_vec()),
        }

        is_beat
    }

    /// Drop all detector state, returning to unseeded
    pub fn reset(&mut self) {
        self.prev = None;
        self.flux_history.clear();
        self.last_beat = f64::NEG_INFINITY;
    }
}
