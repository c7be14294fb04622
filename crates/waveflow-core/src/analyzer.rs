//! FFT spectrum analyzer - turns raw sample chunks into per-frame
//! magnitude snapshots for the visual pipeline.

use crate::spectrum::{SpectrumFrame, SPECTRUM_MAX};
use crossbeam_channel::{bounded, Receiver, Sender};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

/// Scales normalized FFT magnitudes into the byte range the renderers
/// consume. Tuned so a full-scale tone lands near the top of the range
/// with headroom to spare.
const MAG_TO_BYTE: f32 = 20.0;

/// Configuration for [`SpectrumAnalyzer`]
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzerConfig {
    /// Sample rate of the incoming audio
    pub sample_rate: u32,
    /// FFT size (power of 2)
    pub fft_size: usize,
    /// Overlap ratio between FFT frames (0.0 - 1.0, typically 0.5)
    pub overlap: f32,
    /// Exponential smoothing factor for output magnitudes
    pub smoothing: f32,
}

impl Default for SpectrumAnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            fft_size: 2048,
            overlap: 0.5,
            smoothing: 0.6,
        }
    }
}

/// Hann-windowed FFT front end with hop-size buffering.
///
/// Feed arbitrary sample chunks with `process_samples`; a new magnitude
/// snapshot is produced every hop. Snapshots are exponentially smoothed and
/// rescaled into `0..=SPECTRUM_MAX`.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    config: SpectrumAnalyzerConfig,

    /// Ring buffer of incoming samples, one FFT window long
    input_buffer: Vec<f32>,
    buffer_write_pos: usize,
    samples_since_fft: usize,
    hop_size: usize,
    total_samples: u64,

    fft_buffer: Vec<Complex<f32>>,
    scratch_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,

    /// Smoothed byte-range magnitudes, half the FFT size
    magnitudes: Vec<f32>,

    frame_sender: Sender<SpectrumFrame>,
    frame_receiver: Receiver<SpectrumFrame>,
    fft_count: u64,
}

impl SpectrumAnalyzer {
    /// Create an analyzer with the given configuration
    pub fn new(config: SpectrumAnalyzerConfig) -> Self {
        let fft_size = config.fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let hop_size = (((1.0 - config.overlap) * fft_size as f32) as usize).max(1);
        let window = hann_window(fft_size);
        let (tx, rx) = bounded(16);

        debug!(
            "SpectrumAnalyzer created: sample_rate={}, fft_size={}, hop_size={}",
            config.sample_rate, fft_size, hop_size
        );

        Self {
            fft,
            input_buffer: vec![0.0; fft_size],
            buffer_write_pos: 0,
            samples_since_fft: 0,
            hop_size,
            total_samples: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            window,
            magnitudes: vec![0.0; fft_size / 2],
            frame_sender: tx,
            frame_receiver: rx,
            fft_count: 0,
            config: SpectrumAnalyzerConfig { fft_size, ..config },
        }
    }

    /// Feed a chunk of samples; emits a snapshot per completed hop.
    ///
    /// Non-finite samples are replaced with silence before they can
    /// contaminate the magnitudes.
    pub fn process_samples(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        for &sample in samples {
            let sample = if sample.is_finite() { sample } else { 0.0 };
            self.input_buffer[self.buffer_write_pos] = sample;
            self.buffer_write_pos = (self.buffer_write_pos + 1) % self.config.fft_size;
            self.samples_since_fft += 1;
            self.total_samples += 1;

            if self.samples_since_fft >= self.hop_size
                && self.total_samples >= self.config.fft_size as u64
            {
                self.perform_fft();
                self.samples_since_fft = 0;
            }
        }
    }

    fn perform_fft(&mut self) {
        self.fft_count += 1;

        // Unwrap the ring buffer; the write position marks the oldest sample
        for i in 0..self.config.fft_size {
            let src = (self.buffer_write_pos + i) % self.config.fft_size;
            self.fft_buffer[i] = Complex::new(self.input_buffer[src] * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let norm = 1.0 / (self.config.fft_size as f32).sqrt();
        let smoothing = self.config.smoothing.clamp(0.0, 0.99);
        for (i, out) in self.magnitudes.iter_mut().enumerate() {
            let magnitude = (self.fft_buffer[i].norm() * norm * MAG_TO_BYTE).min(SPECTRUM_MAX);
            *out = *out * smoothing + magnitude * (1.0 - smoothing);
        }

        if self.fft_count % 100 == 0 {
            let shown = self.magnitudes.len().min(4);
            trace!("FFT #{}: low bins {:?}", self.fft_count, &self.magnitudes[..shown]);
        }

        // Latest-value semantics: drop the frame if the consumer lags
        let _ = self
            .frame_sender
            .try_send(SpectrumFrame::mono(self.magnitudes.clone()));
    }

    /// Latest smoothed snapshot
    pub fn snapshot(&self) -> SpectrumFrame {
        SpectrumFrame::mono(self.magnitudes.clone())
    }

    /// Try to receive a produced snapshot from the analyzer channel
    pub fn try_receive(&self) -> Option<SpectrumFrame> {
        self.frame_receiver.try_recv().ok()
    }

    /// Number of frequency bins in produced snapshots
    pub fn bin_count(&self) -> usize {
        self.magnitudes.len()
    }

    /// Drop all buffered audio and smoothed magnitudes
    pub fn reset(&mut self) {
        self.input_buffer.fill(0.0);
        self.buffer_write_pos = 0;
        self.samples_since_fft = 0;
        self.total_samples = 0;
        self.magnitudes.fill(0.0);
        self.fft_count = 0;
        debug!("SpectrumAnalyzer reset");
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / (size.saturating_sub(1)).max(1) as f32;
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_sine_lands_in_the_right_bin_region() {
        let config = SpectrumAnalyzerConfig {
            fft_size: 2048,
            smoothing: 0.0,
            ..Default::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(config);
        analyzer.process_samples(&sine(100.0, 44100.0, 8192));

        let frame = analyzer.snapshot();
        // 100Hz at 44.1kHz/2048 bins is bin ~4-5
        let low: f32 = frame.left[..16].iter().sum();
        let high: f32 = frame.left[256..512].iter().sum();
        assert!(
            low > high,
            "low-frequency tone should dominate the low bins: low={}, high={}",
            low,
            high
        );
    }

    #[test]
    fn test_magnitudes_stay_in_byte_range() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumAnalyzerConfig {
            fft_size: 1024,
            smoothing: 0.0,
            ..Default::default()
        });
        // Clipped square-ish input, as loud as it gets
        let loud = vec![1.0f32; 8192];
        analyzer.process_samples(&loud);
        for bin in &analyzer.snapshot().left {
            assert!((0.0..=SPECTRUM_MAX).contains(bin));
        }
    }

    #[test]
    fn test_bad_samples_do_not_contaminate() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumAnalyzerConfig {
            fft_size: 1024,
            ..Default::default()
        });
        let bad = vec![f32::NAN; 4096];
        analyzer.process_samples(&bad);
        for bin in &analyzer.snapshot().left {
            assert!(bin.is_finite());
        }
    }

    #[test]
    fn test_channel_delivers_frames() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumAnalyzerConfig {
            fft_size: 1024,
            smoothing: 0.0,
            ..Default::default()
        });
        analyzer.process_samples(&sine(440.0, 44100.0, 4096));
        let frame = analyzer.try_receive().expect("a frame should be queued");
        assert_eq!(frame.len(), 512);
    }

    #[test]
    fn test_reset_clears_magnitudes() {
        let mut analyzer = SpectrumAnalyzer::new(SpectrumAnalyzerConfig::default());
        analyzer.process_samples(&sine(440.0, 44100.0, 8192));
        assert!(analyzer.snapshot().left.iter().any(|&m| m > 0.0));
        analyzer.reset();
        assert!(analyzer.snapshot().left.iter().all(|&m| m == 0.0));
    }
}
