//! Logging setup
//!
//! The engine only emits `tracing` events; binaries decide where they go by
//! calling [`init`] once at startup. Output always goes to stderr so that
//! generated source and diffs on stdout stay clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter directive for a `-v` count
///
/// `RUST_LOG` takes precedence over this when set.
#[must_use]
pub const fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,django_codegen=debug",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use django_codegen::observability::{self, LogFormat};
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init(1, LogFormat::Text)?;
/// tracing::info!("generator started");
/// # Ok(())
/// # }
/// ```
pub fn init(verbosity: u8, format: LogFormat) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(verbosity > 1)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(())
}
