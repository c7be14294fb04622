//! Spectrum snapshot types shared by the analysis and render pipeline.

/// Largest representable magnitude for a single frequency bin.
///
/// The whole pipeline works on byte-range magnitudes: analysis thresholds,
/// the noise filter ceiling and renderer gain factors all assume bins in
/// `0.0..=SPECTRUM_MAX`.
pub const SPECTRUM_MAX: f32 = 255.0;

/// One frame's frequency-magnitude snapshot.
///
/// `left` always holds the primary (or mono) channel. Stereo-aware renderers
/// read `right` when present; everything else ignores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumFrame {
    /// Primary channel magnitudes, one per frequency bin
    pub left: Vec<f32>,
    /// Optional second channel, same bin count as `left`
    pub right: Option<Vec<f32>>,
}

impl SpectrumFrame {
    /// Create a mono snapshot
    pub fn mono(bins: Vec<f32>) -> Self {
        Self {
            left: bins,
            right: None,
        }
    }

    /// Create a stereo snapshot
    pub fn stereo(left: Vec<f32>, right: Vec<f32>) -> Self {
        Self {
            left,
            right: Some(right),
        }
    }

    /// Number of frequency bins in the primary channel
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when the snapshot carries no bins
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Replace non-finite samples with 0 and clamp into `0..=SPECTRUM_MAX`.
    ///
    /// Everything downstream assumes finite byte-range magnitudes, so frames
    /// arriving from outside the crate are sanitized once at the boundary.
    pub fn sanitize(&mut self) {
        sanitize_bins(&mut self.left);
        if let Some(right) = &mut self.right {
            sanitize_bins(right);
        }
    }
}

fn sanitize_bins(bins: &mut [f32]) {
    for bin in bins {
        if !bin.is_finite() {
            *bin = 0.0;
        } else {
            *bin = bin.clamp(0.0, SPECTRUM_MAX);
        }
    }
}
