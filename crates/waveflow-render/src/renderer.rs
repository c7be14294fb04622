//! The renderer contract shared by every drawing strategy.

use crate::surface::Canvas;
use waveflow_core::{band_level, Palette, Quality, VisualizerSettings};

/// Everything a strategy may read during one frame.
///
/// The `rotation` phase is the only time source strategies may rely on for
/// core motion; it is advanced by the orchestrator at a fixed per-frame
/// increment scaled by the configured speed, which keeps every strategy
/// replayable under a fixed frame stream.
pub struct FrameInput<'a> {
    /// Primary-channel magnitude snapshot, bins in `0..=SPECTRUM_MAX`
    pub spectrum: &'a [f32],
    /// Optional right-channel snapshot for stereo-aware strategies
    pub alt_spectrum: Option<&'a [f32]>,
    /// Logical surface width
    pub width: f32,
    /// Logical surface height
    pub height: f32,
    /// Color palette, cyclically indexed
    pub palette: &'a Palette,
    /// Immutable-per-frame configuration
    pub settings: &'a VisualizerSettings,
    /// Monotonically increasing phase accumulator
    pub rotation: f32,
    /// Whether this frame carries an onset
    pub beat: bool,
}

impl FrameInput<'_> {
    /// Sensitivity-scaled normalized energy of an index-percentage band.
    pub fn level(&self, start_frac: f32, end_frac: f32) -> f32 {
        (band_level(self.spectrum, start_frac, end_frac) * self.settings.sensitivity)
            .clamp(0.0, 1.0)
    }

    /// Bass band energy in `0..=1`
    pub fn bass(&self) -> f32 {
        self.level(0.0, 0.12)
    }

    /// Mid band energy in `0..=1`
    pub fn mid(&self) -> f32 {
        self.level(0.12, 0.5)
    }

    /// Treble band energy in `0..=1`
    pub fn treble(&self) -> f32 {
        self.level(0.5, 1.0)
    }
}

/// One drawing strategy.
///
/// `draw` must tolerate any input - an empty palette or spectrum degrades
/// to a no-op, never a panic. Strategies own all their mutable state
/// (particle pools, caches, phase accumulators); nothing is global.
pub trait Renderer: Send {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// (Re)allocate internal pools and caches.
    ///
    /// Called on activation and whenever the surface is replaced; not
    /// called when switching away and back, so strategies resume where
    /// they left off.
    fn init(&mut self, width: f32, height: f32, quality: Quality);

    /// Draw one frame using only `frame` plus internal state.
    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveflow_core::SPECTRUM_MAX;

    #[test]
    fn test_levels_respect_sensitivity_and_clamp() {
        let settings = VisualizerSettings {
            sensitivity: 3.0,
            ..Default::default()
        };
        let palette = Palette::default();
        let spectrum = vec![SPECTRUM_MAX * 0.5; 128];
        let frame = FrameInput {
            spectrum: &spectrum,
            alt_spectrum: None,
            width: 640.0,
            height: 360.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.0,
            beat: false,
        };
        // 0.5 energy at 3x sensitivity clamps to 1.0
        assert_eq!(frame.bass(), 1.0);
    }

    #[test]
    fn test_levels_of_empty_spectrum_are_zero() {
        let settings = VisualizerSettings::default();
        let palette = Palette::default();
        let frame = FrameInput {
            spectrum: &[],
            alt_spectrum: None,
            width: 640.0,
            height: 360.0,
            palette: &palette,
            settings: &settings,
            rotation: 0.0,
            beat: false,
        };
        assert_eq!(frame.bass(), 0.0);
        assert_eq!(frame.mid(), 0.0);
        assert_eq!(frame.treble(), 0.0);
    }
}
