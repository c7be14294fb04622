//! WaveFlow Core - Audio Analysis and Shared Domain Types
//!
//! This crate contains the analysis front end of the visualizer pipeline:
//! - Spectrum snapshot types
//! - Signal utilities (band averages, compression, noise floor, gain control)
//! - Spectral-flux beat detection
//! - FFT spectrum analyzer
//! - Settings, palettes and the pulse effect bridge

#![warn(missing_docs)]

use thiserror::Error;

pub mod analyzer;
pub mod beat;
pub mod logging;
pub mod palette;
pub mod pulse;
pub mod settings;
pub mod signal;
pub mod spectrum;

// --- Re-exports grouped by category ---

// Analysis
pub use analyzer::{SpectrumAnalyzer, SpectrumAnalyzerConfig};
pub use beat::BeatDetector;
pub use signal::{average, band_level, soft_compress, AdaptiveNoiseFilter, DynamicPeakLimiter};
pub use spectrum::{SpectrumFrame, SPECTRUM_MAX};

// Configuration
pub use logging::LogConfig;
pub use palette::{Palette, PalettePreset, Rgb};
pub use settings::{Quality, VisualizerSettings};

// Overlay boundary
pub use pulse::{PulseBridge, PulseLevels};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A settings or analyzer configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
