//! Signal utilities: band sampling, soft compression, adaptive noise
//! filtering and automatic gain reduction.

use crate::spectrum::SPECTRUM_MAX;

/// Mean of `spectrum[start..min(end, len)]`.
///
/// Returns 0.0 when the clamped range is empty. Never reads past the end of
/// the slice.
pub fn average(spectrum: &[f32], start: usize, end: usize) -> f32 {
    let end = end.min(spectrum.len());
    if start >= end {
        return 0.0;
    }
    let slice = &spectrum[start..end];
    slice.iter().sum::<f32>() / slice.len() as f32
}

/// Normalized energy of an index-percentage band.
///
/// Bands are addressed by fraction of the bin count (bass/mid/treble are
/// sub-ranges of the spectrum, not fixed indices). Output is the band mean
/// scaled into `0..=1`.
pub fn band_level(spectrum: &[f32], start_frac: f32, end_frac: f32) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let len = spectrum.len() as f32;
    let start = (start_frac.clamp(0.0, 1.0) * len) as usize;
    let end = (end_frac.clamp(0.0, 1.0) * len).ceil() as usize;
    (average(spectrum, start, end) / SPECTRUM_MAX).clamp(0.0, 1.0)
}

/// Soft compression: `min(value, 1)^power`.
///
/// Monotonic in `value`, maps `[0, 1]` into `[0, 1]`. Tames loud bins
/// without hard clipping.
pub fn soft_compress(value: f32, power: f32) -> f32 {
    value.clamp(0.0, 1.0).powf(power)
}

/// Per-bin floor rise rate while the sample sits above the floor
const FLOOR_RISE: f32 = 0.001;
/// Per-bin floor fall rate while the sample sits below the floor
const FLOOR_FALL: f32 = 0.1;
/// Flat offset subtracted on top of the tracked floor
const FLOOR_OFFSET: f32 = 2.0;
/// Extra subtraction per bin index; high bins carry more broadband hiss
const BIN_OFFSET_SLOPE: f32 = 0.02;
/// Makeup gain applied after subtraction
const MAKEUP_GAIN: f32 = 1.15;

/// Adaptive per-bin noise floor subtraction.
///
/// Stateful; `process` mutates the given spectrum in place by contract. The
/// floor for each bin rises slowly toward louder samples and tracks quieter
/// samples quickly, so sustained background noise is learned and removed
/// while transients pass through.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveNoiseFilter {
    floor: Vec<f32>,
}

impl AdaptiveNoiseFilter {
    /// Create a filter with an empty floor; the floor array is sized on the
    /// first call to `process`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtract the tracked noise floor from `spectrum` in place.
    ///
    /// The internal floor array resets whenever the incoming bin count
    /// changes. Bin 0 is always zeroed (DC offset artifact).
    pub fn process(&mut self, spectrum: &mut [f32]) {
        if spectrum.is_empty() {
            return;
        }
        if self.floor.len() != spectrum.len() {
            self.floor = vec![0.0; spectrum.len()];
        }

        for (i, sample) in spectrum.iter_mut().enumerate() {
            let value = if sample.is_finite() { *sample } else { 0.0 };
            let floor = &mut self.floor[i];
            let rate = if value >= *floor { FLOOR_RISE } else { FLOOR_FALL };
            *floor += (value - *floor) * rate;

            let cut = *floor + FLOOR_OFFSET + i as f32 * BIN_OFFSET_SLOPE;
            *sample = ((value - cut).max(0.0) * MAKEUP_GAIN).min(SPECTRUM_MAX);
        }
        spectrum[0] = 0.0;
    }
}

/// Peak decay per call
const PEAK_DECAY: f32 = 0.995;
/// Energy-to-peak ratio above which fatigue accumulates
const FATIGUE_THRESHOLD: f32 = 0.85;
const FATIGUE_RISE: f32 = 0.01;
const FATIGUE_DECAY: f32 = 0.98;
/// Fatigue contribution cap inside the gain denominator
const FATIGUE_CAP: f32 = 0.5;

/// Automatic gain reduction under sustained loudness.
///
/// Tracks a decaying maximum of the incoming energy plus a fatigue
/// accumulator that builds while the energy stays near that maximum. The
/// returned gain drops during loud sustained passages and recovers
/// gradually afterwards.
#[derive(Debug, Clone)]
pub struct DynamicPeakLimiter {
    peak: f32,
    fatigue: f32,
}

impl Default for DynamicPeakLimiter {
    fn default() -> Self {
        Self {
            peak: 0.0,
            fatigue: 0.0,
        }
    }
}

impl DynamicPeakLimiter {
    /// Create a limiter with no accumulated state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one energy sample and get the gain to apply this frame.
    pub fn process(&mut self, energy: f32) -> f32 {
        let energy = if energy.is_finite() { energy.max(0.0) } else { 0.0 };

        self.peak = energy.max(self.peak * PEAK_DECAY);
        if energy > self.peak * FATIGUE_THRESHOLD {
            self.fatigue += FATIGUE_RISE;
        } else {
            self.fatigue *= FATIGUE_DECAY;
        }

        1.0 / (self.peak.max(0.1) * (1.0 + self.fatigue.min(FATIGUE_CAP)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_whole_range() {
        let spectrum = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(average(&spectrum, 0, spectrum.len()), 2.5);
    }

    #[test]
    fn test_average_empty_range() {
        let spectrum = [1.0, 2.0, 3.0];
        assert_eq!(average(&spectrum, 2, 2), 0.0);
        assert_eq!(average(&spectrum, 3, 1), 0.0);
        assert_eq!(average(&[], 0, 10), 0.0);
    }

    #[test]
    fn test_average_clamps_end() {
        let spectrum = [10.0, 20.0];
        // end beyond length is clamped, not an error
        assert_eq!(average(&spectrum, 0, 100), 15.0);
    }

    #[test]
    fn test_band_level_bounds() {
        let spectrum = vec![SPECTRUM_MAX; 64];
        assert!((band_level(&spectrum, 0.0, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(band_level(&[], 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_soft_compress_endpoints() {
        assert_eq!(soft_compress(0.0, 0.5), 0.0);
        assert_eq!(soft_compress(1.0, 0.5), 1.0);
        // values above 1 clip to 1
        assert_eq!(soft_compress(3.0, 0.5), 1.0);
    }

    #[test]
    fn test_noise_filter_zeroes_dc_bin() {
        let mut filter = AdaptiveNoiseFilter::new();
        let mut spectrum = vec![200.0; 16];
        filter.process(&mut spectrum);
        assert_eq!(spectrum[0], 0.0);
    }

    #[test]
    fn test_noise_filter_resets_on_length_change() {
        let mut filter = AdaptiveNoiseFilter::new();
        let mut a = vec![100.0; 8];
        for _ in 0..50 {
            a.copy_from_slice(&[100.0; 8]);
            filter.process(&mut a);
        }
        let learned = filter.floor[4];
        assert!(learned > 0.0);

        let mut b = vec![100.0; 16];
        filter.process(&mut b);
        // new length, fresh floor
        assert!(filter.floor[4] < learned);
        assert_eq!(filter.floor.len(), 16);
    }

    #[test]
    fn test_noise_filter_output_is_bounded() {
        let mut filter = AdaptiveNoiseFilter::new();
        let mut spectrum = vec![f32::INFINITY, 1000.0, -50.0, SPECTRUM_MAX];
        filter.process(&mut spectrum);
        for sample in &spectrum {
            assert!(sample.is_finite());
            assert!((0.0..=SPECTRUM_MAX).contains(sample));
        }
    }

    #[test]
    fn test_limiter_reduces_gain_under_sustained_loudness() {
        let mut limiter = DynamicPeakLimiter::new();
        let initial = limiter.process(1.0);
        let mut last = initial;
        for _ in 0..200 {
            last = limiter.process(1.0);
        }
        assert!(
            last < initial,
            "gain should fall under sustained loudness: {} -> {}",
            initial,
            last
        );

        // Silence lets the peak decay and the gain recover
        for _ in 0..2000 {
            limiter.process(0.0);
        }
        let recovered = limiter.process(0.0);
        assert!(recovered > last, "gain should recover after silence");
    }

    #[test]
    fn test_limiter_gain_is_finite_for_zero_energy() {
        let mut limiter = DynamicPeakLimiter::new();
        let gain = limiter.process(0.0);
        assert!(gain.is_finite());
        // peak is floored at 0.1, so the gain caps at 10
        assert!(gain <= 10.0);
    }
}
