//! Layered twin-sine ribbons with per-layer auto gain and parallax.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::{band_level, Quality};

const LAYER_COUNT: usize = 6;
/// Slow decay of the per-layer max-energy tracker
const MAX_DECAY: f32 = 0.995;
/// Gain targets this fraction of full scale, leaving headroom
const HEADROOM: f32 = 0.8;
const ATTACK: f32 = 0.4;
const RELEASE: f32 = 0.08;

struct Layer {
    band: (f32, f32),
    energy: f32,
    max_energy: f32,
    /// Nearer layers scroll faster
    parallax: f32,
}

/// Six frequency-band ribbons; each tracks its own slow-decaying maximum so
/// quiet bands stay visible without hard normalization.
pub struct WaveLayers {
    layers: Vec<Layer>,
    segments: usize,
}

impl WaveLayers {
    /// Create an uninitialized ribbon stack
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            segments: 0,
        }
    }
}

impl Default for WaveLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for WaveLayers {
    fn name(&self) -> &'static str {
        "wave_layers"
    }

    fn init(&mut self, _width: f32, _height: f32, quality: Quality) {
        self.segments = quality.scale_count(96);
        self.layers = (0..LAYER_COUNT)
            .map(|i| {
                let lo = i as f32 / LAYER_COUNT as f32;
                let hi = (i + 1) as f32 / LAYER_COUNT as f32;
                Layer {
                    band: (lo, hi),
                    energy: 0.0,
                    max_energy: 0.0,
                    parallax: 0.6 + i as f32 * 0.35,
                }
            })
            .collect();
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.layers.is_empty() {
            return;
        }

        let segments = self.segments.max(2);
        let mut points = Vec::with_capacity(segments + 1);
        let mut mirror = Vec::with_capacity(segments + 1);

        for (i, layer) in self.layers.iter_mut().enumerate() {
            let raw = band_level(frame.spectrum, layer.band.0, layer.band.1)
                * frame.settings.sensitivity;

            // Auto gain: track a slowly decaying maximum, aim for headroom
            layer.max_energy = (layer.max_energy * MAX_DECAY).max(raw);
            let target = if layer.max_energy > 0.001 {
                (raw / layer.max_energy * HEADROOM).min(1.0)
            } else {
                0.0
            };
            let rate = if target > layer.energy { ATTACK } else { RELEASE };
            layer.energy += (target - layer.energy) * rate;

            let Some(color) = frame.palette.cycle(i) else { continue };
            let baseline = frame.height * (0.25 + 0.5 * i as f32 / LAYER_COUNT as f32);
            let amplitude = layer.energy * frame.height * 0.18;
            let phase = frame.rotation * layer.parallax * 6.0;

            points.clear();
            mirror.clear();
            for s in 0..=segments {
                let t = s as f32 / segments as f32;
                let x = t * frame.width;
                let wave = (t * std::f32::consts::TAU * 2.0 + phase).sin()
                    + 0.5 * (t * std::f32::consts::TAU * 3.0 - phase * 0.7).sin();
                let y = baseline + wave * amplitude;
                points.push(Vec2::new(x, y));
                // Twin ribbon mirrored about the baseline
                mirror.push(Vec2::new(x, 2.0 * baseline - y));
            }
            let alpha = 0.35 + layer.energy * 0.5;
            canvas.stroke_polyline(&points, 2.0, color, alpha);
            canvas.stroke_polyline(&mirror, 1.2, color, alpha * 0.6);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings, SPECTRUM_MAX};

    #[test]
    fn test_auto_gain_keeps_quiet_bands_visible() {
        let mut waves = WaveLayers::new();
        waves.init(160.0, 90.0, Quality::Med);
        let mut surface = Surface::new(160, 90, 1.0).unwrap();
        let palette = PalettePreset::Sunset.palette();
        let settings = VisualizerSettings::default();

        // A quiet but steady signal: auto gain should pull energy up near
        // the headroom target rather than leaving it at the raw level
        let spectrum = vec![SPECTRUM_MAX * 0.05; 128];
        for i in 0..300 {
            let input = FrameInput {
                spectrum: &spectrum,
                alt_spectrum: None,
                width: 160.0,
                height: 90.0,
                palette: &palette,
                settings: &settings,
                rotation: i as f32 * 0.005,
                beat: false,
            };
            waves.draw(&mut surface.canvas(), &input);
        }
        for layer in &waves.layers {
            assert!(
                layer.energy > 0.5,
                "steady signal should gain up toward headroom, got {}",
                layer.energy
            );
            assert!(layer.energy <= 1.0);
        }
    }

    #[test]
    fn test_attack_is_faster_than_release() {
        let mut waves = WaveLayers::new();
        waves.init(160.0, 90.0, Quality::Low);
        let mut surface = Surface::new(160, 90, 1.0).unwrap();
        let palette = PalettePreset::Sunset.palette();
        let settings = VisualizerSettings::default();

        let loud = vec![SPECTRUM_MAX; 128];
        let quiet = vec![0.0f32; 128];

        let draw = |waves: &mut WaveLayers, surface: &mut Surface, spectrum: &[f32]| {
            let input = FrameInput {
                spectrum,
                alt_spectrum: None,
                width: 160.0,
                height: 90.0,
                palette: &palette,
                settings: &settings,
                rotation: 0.0,
                beat: false,
            };
            waves.draw(&mut surface.canvas(), &input);
        };

        draw(&mut waves, &mut surface, &loud);
        let after_attack = waves.layers[0].energy;

        // Let it settle high, then measure one release step
        for _ in 0..60 {
            draw(&mut waves, &mut surface, &loud);
        }
        let settled = waves.layers[0].energy;
        draw(&mut waves, &mut surface, &quiet);
        let after_release = waves.layers[0].energy;

        let attack_step = after_attack;
        let release_step = settled - after_release;
        assert!(
            attack_step > release_step,
            "attack should move faster than release: {} vs {}",
            attack_step,
            release_step
        );
    }
}
