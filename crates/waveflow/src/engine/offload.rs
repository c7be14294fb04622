//! Offloaded hosting: the engine loop on a dedicated worker thread.
//!
//! The worker owns its engine, surface and renderers outright; the host
//! keeps nothing but a channel sender. Messages are the only shared
//! concept, and the channel is strictly ordered, so there is no shared
//! mutable state between the two sides.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tiny_skia::Pixmap;
use tracing::{debug, info, warn};
use waveflow_core::{Palette, SpectrumFrame, VisualizerSettings};
use waveflow_render::VisualMode;

use super::Engine;

/// Draw-failure log sampling on the worker; one line per this many
/// failures keeps a permanently broken renderer from flooding the log
const WORKER_FAILURE_LOG_INTERVAL: u64 = 120;
const CHANNEL_DEPTH: usize = 64;

/// Host-to-worker protocol.
#[derive(Debug)]
pub enum EngineMessage {
    /// One-time setup: allocate the surface, instantiate every renderer
    /// and start the loop
    Init {
        /// Logical surface width
        width: u32,
        /// Logical surface height
        height: u32,
        /// Backing-store scale
        device_pixel_ratio: f32,
    },
    /// Update backing-store dimensions; logical drawing scale follows
    Resize {
        /// New logical width
        width: u32,
        /// New logical height
        height: u32,
        /// New backing-store scale
        device_pixel_ratio: f32,
    },
    /// Replace mode, settings and palette; a mode change forces a full
    /// clear and re-initializes the newly active renderer
    Config {
        /// Visual mode to activate
        mode: VisualMode,
        /// New settings
        settings: VisualizerSettings,
        /// New palette
        palette: Palette,
    },
    /// Replace the buffered spectrum snapshot used by the next frame.
    /// Latest-value semantics: a burst only ever renders the newest.
    Frame {
        /// The snapshot
        spectrum: SpectrumFrame,
    },
    /// Copy the most recently presented pixels back to the host
    Capture {
        /// Reply channel for the copied pixmap
        reply: Sender<Pixmap>,
    },
    /// Cooperative shutdown: finish the in-flight frame, then exit
    Stop,
}

/// Handle to an engine running on its own worker thread.
pub struct OffloadedEngine {
    sender: Sender<EngineMessage>,
    worker: Option<JoinHandle<()>>,
}

impl OffloadedEngine {
    /// Spawn the worker. The loop idles until an `Init` message arrives.
    ///
    /// `frame_rate` paces the loop; rendering a frame longer than its slot
    /// simply lowers the effective rate (motion is phase-based, so pacing
    /// variance changes perceived speed, not correctness).
    pub fn spawn(frame_rate: f32) -> Self {
        let (tx, rx) = bounded(CHANNEL_DEPTH);
        let worker = thread::Builder::new()
            .name("waveflow-render".to_string())
            .spawn(move || worker_loop(rx, frame_rate))
            .expect("Failed to spawn render worker");
        Self {
            sender: tx,
            worker: Some(worker),
        }
    }

    /// Send a protocol message; returns false when the worker is gone.
    pub fn send(&self, message: EngineMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Blocking readback of the latest presented pixels.
    pub fn capture(&self, timeout: Duration) -> Option<Pixmap> {
        let (reply, response) = bounded(1);
        if !self.send(EngineMessage::Capture { reply }) {
            return None;
        }
        response.recv_timeout(timeout).ok()
    }

    /// Stop the worker and wait for it to exit.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.sender.send(EngineMessage::Stop);
            if worker.join().is_err() {
                warn!("render worker exited abnormally");
            }
        }
    }
}

impl Drop for OffloadedEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(rx: Receiver<EngineMessage>, frame_rate: f32) {
    info!("Render worker started");
    let frame_duration = Duration::from_secs_f32(1.0 / frame_rate.clamp(1.0, 240.0));
    let started = Instant::now();
    let mut engine: Option<Engine> = None;

    'run: loop {
        // Idle (no engine yet) blocks; live engines only drain what is
        // already queued so the frame cadence holds
        if engine.is_none() {
            match rx.recv() {
                Ok(message) => {
                    if handle_message(&mut engine, message) {
                        break 'run;
                    }
                }
                Err(_) => break 'run,
            }
        }
        while let Ok(message) = rx.try_recv() {
            if handle_message(&mut engine, message) {
                break 'run;
            }
        }

        let Some(engine) = engine.as_mut() else { continue };
        let frame_start = Instant::now();
        engine.tick(started.elapsed().as_secs_f64());

        // Pace to the configured frame rate
        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }
    info!("Render worker stopped");
}

/// Apply one message; returns true on `Stop`.
fn handle_message(engine: &mut Option<Engine>, message: EngineMessage) -> bool {
    match message {
        EngineMessage::Init {
            width,
            height,
            device_pixel_ratio,
        } => match Engine::new(
            width,
            height,
            device_pixel_ratio,
            VisualMode::default(),
            VisualizerSettings::default(),
            Palette::default(),
        ) {
            Ok(mut fresh) => {
                // The offloaded host always runs the noise filter and
                // samples its failure logs
                fresh.set_noise_filter(true);
                fresh.set_failure_log_interval(WORKER_FAILURE_LOG_INTERVAL);
                debug!("worker engine initialized: {}x{} @ {}", width, height, device_pixel_ratio);
                *engine = Some(fresh);
            }
            Err(err) => warn!("Init rejected: {}", err),
        },
        EngineMessage::Resize {
            width,
            height,
            device_pixel_ratio,
        } => {
            if let Some(engine) = engine {
                if let Err(err) = engine.resize(width, height, device_pixel_ratio) {
                    warn!("Resize rejected: {}", err);
                }
            }
        }
        EngineMessage::Config {
            mode,
            settings,
            palette,
        } => {
            if let Some(engine) = engine {
                engine.set_config(mode, settings, palette);
            }
        }
        EngineMessage::Frame { spectrum } => {
            if let Some(engine) = engine {
                engine.submit_frame(spectrum);
            }
        }
        EngineMessage::Capture { reply } => {
            if let Some(engine) = engine {
                let _ = reply.send(engine.surface().pixmap().clone());
            }
        }
        EngineMessage::Stop => return true,
    }
    false
}
