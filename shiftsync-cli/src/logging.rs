//! Structured logging to stderr.
//!
//! `RUST_LOG` wins when set; otherwise the level follows `-v` (warn, info, debug).

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let filter = build_filter(verbosity)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(verbosity > 1)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

fn build_filter(verbosity: u8) -> Result<EnvFilter, ParseError> {
    if let Ok(spec) = env::var("RUST_LOG") {
        if !spec.trim().is_empty() {
            return EnvFilter::try_new(spec);
        }
    }

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_new(level)
}
