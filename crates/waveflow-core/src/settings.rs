//! Renderer settings - immutable-per-frame configuration.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Coarse performance/fidelity knob controlling particle and segment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Fewest particles/segments
    Low,
    /// Reduced counts
    Med,
    /// Full counts
    #[default]
    High,
}

impl Quality {
    /// Multiplier applied to quality-derived pool and segment counts.
    ///
    /// Lower tiers reduce counts without changing visual semantics.
    pub fn level_scale(self) -> f32 {
        match self {
            Quality::Low => 0.35,
            Quality::Med => 0.65,
            Quality::High => 1.0,
        }
    }

    /// Scale a full-quality count down to this tier, keeping at least one.
    pub fn scale_count(self, full: usize) -> usize {
        ((full as f32 * self.level_scale()) as usize).max(1)
    }
}

/// Immutable-per-frame renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// Gain multiplier applied to spectrum-derived energies
    pub sensitivity: f32,
    /// Time-scale multiplier for the rotation phase and motion rates
    pub speed: f32,
    /// Particle/segment count tier
    pub quality: Quality,
    /// Fade-blend previous frames instead of clearing
    pub trails: bool,
    /// Soft halo embellishment on bright primitives
    pub glow: bool,
    /// A background image layer sits behind the canvas; trail fades must
    /// erase rather than fill black so the background is not darkened
    pub album_art_background: bool,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            speed: 1.0,
            quality: Quality::High,
            trails: true,
            glow: true,
            album_art_background: false,
        }
    }
}

impl VisualizerSettings {
    /// Check that the numeric fields are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "sensitivity must be a positive number, got {}",
                self.sensitivity
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}
