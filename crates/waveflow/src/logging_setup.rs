//! Tracing subscriber setup for the binary.

use anyhow::Result;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};
use waveflow_core::LogConfig;

/// Initialize the logging system from the app configuration.
///
/// `RUST_LOG` overrides the configured level.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy();

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(filter)
    });

    tracing_subscriber::registry().with(console_layer).init();
    Ok(())
}
