// src/telemetry.rs

use crate::error::SimulationError;
use tracing_subscriber::EnvFilter;

/// Installs the global log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `log_level` is used as the filter.
pub fn init(log_level: &str) -> Result<(), SimulationError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|err| {
            SimulationError::Telemetry(format!("invalid log filter '{log_level}': {err}"))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| SimulationError::Telemetry(err.to_string()))
}
