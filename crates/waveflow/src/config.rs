//! Application configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use waveflow_core::{LogConfig, PalettePreset, VisualizerSettings};
use waveflow_render::VisualMode;

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Visual mode to activate at startup
    pub mode: VisualMode,
    /// Palette preset
    pub palette: PalettePreset,
    /// Renderer settings
    pub settings: VisualizerSettings,
    /// Logical surface width
    pub width: u32,
    /// Logical surface height
    pub height: u32,
    /// Backing-store scale
    pub device_pixel_ratio: f32,
    /// Frame rate the loop paces itself to
    pub frame_rate: f32,
    /// Run the adaptive noise filter on incoming snapshots
    pub noise_filter: bool,
    /// Logging configuration
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: VisualMode::default(),
            palette: PalettePreset::default(),
            settings: VisualizerSettings::default(),
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
            frame_rate: 60.0,
            noise_filter: true,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check dimensional and settings sanity.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate().context("Invalid settings")?;
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("surface dimensions must be non-zero, got {}x{}", self.width, self.height);
        }
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            anyhow::bail!("device_pixel_ratio must be positive, got {}", self.device_pixel_ratio);
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            anyhow::bail!("frame_rate must be positive, got {}", self.frame_rate);
        }
        Ok(())
    }
}

/// Parse a visual-mode name as it appears in configuration files.
pub fn parse_mode(name: &str) -> Option<VisualMode> {
    match name {
        "bars" => Some(VisualMode::Bars),
        "nebula" => Some(VisualMode::Nebula),
        "bubbles" => Some(VisualMode::Bubbles),
        "starfield" => Some(VisualMode::Starfield),
        "plasma" => Some(VisualMode::Plasma),
        "wave_layers" => Some(VisualMode::WaveLayers),
        "rings" => Some(VisualMode::Rings),
        "lasers" => Some(VisualMode::Lasers),
        "kaleidoscope" => Some(VisualMode::Kaleidoscope),
        "hex_grid" => Some(VisualMode::HexGrid),
        "synthwave" => Some(VisualMode::Synthwave),
        "fluid" => Some(VisualMode::Fluid),
        "ripples" => Some(VisualMode::Ripples),
        "corona" => Some(VisualMode::Corona),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_round_trips_every_mode_name() {
        for mode in VisualMode::ALL {
            let name = serde_json::to_string(&mode).unwrap();
            let name = name.trim_matches('"');
            assert_eq!(parse_mode(name), Some(mode), "mode name {}", name);
        }
        assert_eq!(parse_mode("unknown"), None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            mode = "nebula"
            width = 640

            [settings]
            sensitivity = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, VisualMode::Nebula);
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert!((config.settings.sensitivity - 1.5).abs() < 1e-6);
        assert!(config.settings.trails);
    }
}
