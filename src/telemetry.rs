use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| Error::Cli(format!("invalid log level '{}': {}", level, err)))?,
    };

    // A subscriber may already be installed when embedded in another binary.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
