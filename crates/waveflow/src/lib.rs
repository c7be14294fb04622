//! WaveFlow - Audio-Reactive Generative Visuals
//!
//! Library surface of the application crate: the render-loop engine, its
//! offloaded worker host, and the app configuration. The `waveflow` binary
//! wires these to a WAV front end for offline rendering.

pub mod config;
pub mod engine;

pub use config::AppConfig;
pub use engine::offload::{EngineMessage, OffloadedEngine};
pub use engine::Engine;
