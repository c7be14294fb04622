//! WaveFlow binary - offline WAV-driven frame rendering.

mod logging_setup;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use waveflow::config::{parse_mode, AppConfig};
use waveflow::Engine;
use waveflow_core::{PulseBridge, SpectrumAnalyzer, SpectrumAnalyzerConfig, SpectrumFrame};
use waveflow_render::{RendererRegistry, VisualMode};

#[derive(Parser)]
#[command(name = "waveflow", version, about = "Audio-reactive generative visuals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a WAV file into a directory of PNG frames
    Render(RenderArgs),
    /// List the available visual modes
    Modes,
}

#[derive(Args)]
struct RenderArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output directory for PNG frames
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Visual mode override
    #[arg(short, long)]
    mode: Option<String>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Write only every Nth frame to disk
    #[arg(long, default_value_t = 1)]
    every: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Modes => {
            let mut registry = RendererRegistry::new();
            for mode in VisualMode::ALL {
                println!("{}", registry.get_mut(mode).name());
            }
            Ok(())
        }
        Command::Render(args) => render(args),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(name) = &args.mode {
        config.mode = parse_mode(name)
            .with_context(|| format!("Unknown visual mode: {}", name))?;
    }
    logging_setup::init(&config.log)?;

    let (left, right, sample_rate) = read_wav(&args.input)?;
    info!(
        "Loaded {}: {} samples/channel at {} Hz{}",
        args.input.display(),
        left.len(),
        sample_rate,
        if right.is_some() { ", stereo" } else { "" }
    );

    let analyzer_config = SpectrumAnalyzerConfig {
        sample_rate,
        ..Default::default()
    };
    let mut left_analyzer = SpectrumAnalyzer::new(analyzer_config.clone());
    let mut right_analyzer = right.as_ref().map(|_| SpectrumAnalyzer::new(analyzer_config));

    let mut engine = Engine::new(
        config.width,
        config.height,
        config.device_pixel_ratio,
        config.mode,
        config.settings.clone(),
        config.palette.palette(),
    )?;
    engine.set_noise_filter(config.noise_filter);
    let mut pulse = PulseBridge::new(0.35);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;

    let samples_per_frame = (sample_rate as f32 / config.frame_rate).max(1.0) as usize;
    let total_frames = (left.len() / samples_per_frame) as u64;
    let frame_count = args.max_frames.map_or(total_frames, |m| m.min(total_frames));
    let every = args.every.max(1);
    let mut written = 0u64;

    for frame_index in 0..frame_count {
        let start = frame_index as usize * samples_per_frame;
        let end = (start + samples_per_frame).min(left.len());
        left_analyzer.process_samples(&left[start..end]);

        let snapshot = match (&mut right_analyzer, &right) {
            (Some(analyzer), Some(samples)) => {
                analyzer.process_samples(&samples[start..end.min(samples.len())]);
                SpectrumFrame::stereo(left_analyzer.snapshot().left, analyzer.snapshot().left)
            }
            _ => left_analyzer.snapshot(),
        };

        let levels = pulse.update(&snapshot.left);
        engine.submit_frame(snapshot);
        engine.tick(frame_index as f64 / config.frame_rate as f64);

        if frame_index % every == 0 {
            let path = args.output.join(format!("frame_{:05}.png", frame_index));
            let png = engine
                .surface()
                .pixmap()
                .encode_png()
                .context("Failed to encode frame")?;
            std::fs::write(&path, png)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
        if frame_index % 60 == 0 {
            debug!(
                "frame {}/{}: pulse scale {:.3}, opacity {:.3}",
                frame_index, frame_count, levels.scale, levels.opacity
            );
        }
    }

    info!(
        "Rendered {} frames ({} written to {}), {} isolated draw failures",
        frame_count,
        written,
        args.output.display(),
        engine.draw_failure_count()
    );
    Ok(())
}

/// Read a WAV file into normalized per-channel sample buffers.
fn read_wav(path: &Path) -> Result<(Vec<f32>, Option<Vec<f32>>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to decode integer samples")?
        }
    };

    match spec.channels {
        0 => anyhow::bail!("WAV file has no channels"),
        1 => Ok((interleaved, None, spec.sample_rate)),
        channels => {
            // Keep the first two channels, drop the rest
            let step = channels as usize;
            let left = interleaved.iter().step_by(step).copied().collect();
            let right = interleaved.iter().skip(1).step_by(step).copied().collect();
            Ok((left, Some(right), spec.sample_rate))
        }
    }
}
