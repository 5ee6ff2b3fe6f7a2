//! Tracing subscriber installation for the console binary.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConsoleError, Result};

/// Default filter when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Installs a stderr `fmt` subscriber filtered by `level`.
///
/// `RUST_LOG` wins over `level` when it is set and valid.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_LEVEL))
            .map_err(|e| ConsoleError::InvalidArgument(format!("invalid log level: {e}")))?,
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| ConsoleError::InvalidArgument("logging already initialized".into()))
}
