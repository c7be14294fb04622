//! Render-loop orchestration.
//!
//! [`Engine`] drives the per-frame cycle: pull the latest spectrum, detect
//! the beat, advance the rotation phase, clear or trail-blend, dispatch to
//! the active renderer, present. It can be driven inline by the caller or
//! moved into a worker thread by [`offload::OffloadedEngine`]; the cycle is
//! identical in both hosting modes.

pub mod offload;

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};
use waveflow_core::{
    AdaptiveNoiseFilter, BeatDetector, Palette, SpectrumFrame, VisualizerSettings,
};
use waveflow_render::{FrameInput, RendererRegistry, Result, Surface, VisualMode};

/// Rotation phase advance per frame before the speed multiplier
const ROTATION_STEP: f32 = 0.005;
/// Trail blend strength; low alpha leaves long tails
const TRAIL_ALPHA: f32 = 0.12;

/// The render-loop orchestrator.
///
/// Owns the surface, the full renderer set, the analysis state and the
/// buffered spectrum snapshot. Scheduling is cooperative: one `tick` runs
/// start-to-finish before the next, and a tick never blocks.
pub struct Engine {
    surface: Surface,
    registry: RendererRegistry,
    mode: VisualMode,
    settings: VisualizerSettings,
    palette: Palette,
    beat_detector: BeatDetector,
    /// One filter per channel; the floors adapt independently
    noise_filters: Option<[AdaptiveNoiseFilter; 2]>,
    spectrum: SpectrumFrame,
    rotation: f32,
    draw_failures: u64,
    /// Log every Nth draw failure (plus the first); the offloaded host
    /// raises this so a permanently broken renderer cannot flood the log
    failure_log_interval: u64,
}

impl Engine {
    /// Create an engine, allocate its surface and initialize the active
    /// renderer.
    pub fn new(
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
        mode: VisualMode,
        settings: VisualizerSettings,
        palette: Palette,
    ) -> Result<Self> {
        let surface = Surface::new(width, height, device_pixel_ratio)?;
        let mut engine = Self {
            surface,
            registry: RendererRegistry::new(),
            mode,
            settings,
            palette,
            beat_detector: BeatDetector::new(),
            noise_filters: None,
            spectrum: SpectrumFrame::default(),
            rotation: 0.0,
            draw_failures: 0,
            failure_log_interval: 1,
        };
        engine.activate_current();
        Ok(engine)
    }

    /// Enable or disable in-place noise-floor filtering of submitted
    /// snapshots. The offloaded host always enables it.
    pub fn set_noise_filter(&mut self, enabled: bool) {
        self.noise_filters =
            enabled.then(|| [AdaptiveNoiseFilter::new(), AdaptiveNoiseFilter::new()]);
    }

    /// Raise the draw-failure log sampling interval.
    pub fn set_failure_log_interval(&mut self, interval: u64) {
        self.failure_log_interval = interval.max(1);
    }

    /// Update the backing store for a new logical size or pixel ratio.
    ///
    /// A real change replaces the drawing surface, so the active renderer
    /// is re-initialized and the canvas fully cleared; an unchanged size is
    /// a no-op.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Result<()> {
        if self.surface.resize(width, height, device_pixel_ratio)? {
            self.activate_current();
        }
        Ok(())
    }

    /// Replace mode, settings and palette.
    ///
    /// A mode change forces a full clear and initializes the newly active
    /// renderer - and only that one, so the previous mode resumes its own
    /// state when selected again.
    pub fn set_config(
        &mut self,
        mode: VisualMode,
        settings: VisualizerSettings,
        palette: Palette,
    ) {
        self.settings = settings;
        self.palette = palette;
        if mode != self.mode {
            debug!("visual mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.activate_current();
        }
    }

    /// Replace the buffered spectrum snapshot used by the next tick.
    ///
    /// Latest-value semantics: an unrendered previous snapshot is simply
    /// dropped. The noise filter runs here, once per arriving snapshot.
    pub fn submit_frame(&mut self, mut frame: SpectrumFrame) {
        frame.sanitize();
        if let Some([left_filter, right_filter]) = &mut self.noise_filters {
            left_filter.process(&mut frame.left);
            if let Some(right) = &mut frame.right {
                right_filter.process(right);
            }
        }
        self.spectrum = frame;
    }

    /// Run one frame of the cycle. `now` is a monotonic timestamp in
    /// seconds, used only for beat debouncing.
    pub fn tick(&mut self, now: f64) {
        let beat = self.beat_detector.update(&self.spectrum.left, now);
        self.rotation += ROTATION_STEP * self.settings.speed;

        if self.settings.trails {
            // With a background image layer the fade must remove image
            // rather than paint black over it
            self.surface
                .trail_fade(TRAIL_ALPHA, self.settings.album_art_background);
        } else {
            self.surface.clear(self.settings.album_art_background);
        }

        let (width, height) = self.surface.logical_size();
        let input = FrameInput {
            spectrum: &self.spectrum.left,
            alt_spectrum: self.spectrum.right.as_deref(),
            width,
            height,
            palette: &self.palette,
            settings: &self.settings,
            rotation: self.rotation,
            beat,
        };

        // Failure isolation: a panicking renderer loses its frame, never
        // the loop
        let renderer = self.registry.get_mut(self.mode);
        let mut canvas = self.surface.canvas();
        let outcome = catch_unwind(AssertUnwindSafe(|| renderer.draw(&mut canvas, &input)));
        if outcome.is_err() {
            self.draw_failures += 1;
            if self.draw_failures == 1 || self.draw_failures % self.failure_log_interval == 0 {
                error!(
                    "renderer '{}' panicked during draw ({} failures so far)",
                    self.registry.get_mut(self.mode).name(),
                    self.draw_failures
                );
            }
        }
    }

    /// Swap in a replacement renderer for `mode` (diagnostics and tests).
    pub fn replace_renderer(
        &mut self,
        mode: VisualMode,
        renderer: Box<dyn waveflow_render::Renderer>,
    ) {
        self.registry.replace(mode, renderer);
        if mode == self.mode {
            self.activate_current();
        }
    }

    /// Currently active mode
    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    /// Number of isolated draw failures so far
    pub fn draw_failure_count(&self) -> u64 {
        self.draw_failures
    }

    /// The presented surface
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    fn activate_current(&mut self) {
        let (width, height) = self.surface.logical_size();
        let quality = self.settings.quality;
        self.surface.clear(self.settings.album_art_background);
        self.registry.get_mut(self.mode).init(width, height, quality);
    }
}
