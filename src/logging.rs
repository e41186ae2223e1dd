use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::InvError;

/// Sends logs to `log_file`. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr. `RUST_LOG` sets the level, default `info`.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), InvError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| InvError::Logging(e.to_string()))
}
