//! Diagnostic logging.
//!
//! `RUST_LOG` takes precedence. Without it the level follows the verbosity
//! flags. Log lines go to stderr so `--format json` output on stdout stays
//! machine-readable.

use crate::config::Verbosity;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set
#[must_use]
pub const fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
        Verbosity::Debug => "debug",
    }
}

/// Install the global subscriber.
///
/// A second call is a no-op.
pub fn init(verbosity: Verbosity, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_debug())
        .with_ansi(ansi)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_verbosity() {
        assert_eq!(default_directive(Verbosity::Quiet), "error");
        assert_eq!(default_directive(Verbosity::Normal), "warn");
        assert_eq!(default_directive(Verbosity::Verbose), "info");
        assert_eq!(default_directive(Verbosity::Debug), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Normal, false);
        init(Verbosity::Debug, false);
    }
}
