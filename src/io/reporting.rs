// src/io/reporting.rs

use crate::error::SimulationError;
use crate::simulation::engine::WeekRecord;
use std::path::Path;
use tracing::info;

/// Writes the weekly trace to a CSV file, one row per simulated week.
///
/// # Arguments
/// * `file_path` - Where to save the file (e.g., "results/covid_first.csv").
/// * `data` - The history recorded by the simulation engine.
pub fn write_week_log(
    file_path: impl AsRef<Path>,
    data: &[WeekRecord],
) -> Result<(), SimulationError> {
    let path = file_path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;

    for record in data {
        wtr.serialize(record)?;
    }

    // Flush so every row reaches the file before we report success
    wtr.flush().map_err(csv::Error::from)?;

    info!(rows = data.len(), path = %path.display(), "weekly trace exported");
    Ok(())
}
