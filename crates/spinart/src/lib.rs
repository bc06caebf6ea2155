//! Host side of the spin-art plotter simulation: configuration loading,
//! a headless playback driver and a real-time session task.

pub mod command;
pub mod config;
pub mod driver;
pub mod session;
pub mod snapshot;

use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays free for JSON output.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
