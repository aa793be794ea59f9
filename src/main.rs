// src/main.rs

use clap::Parser;
use hospital_beds::io::reporting;
use hospital_beds::{
    telemetry, BedSimulation, DemandRatio, NormalSampler, PolicyPriority, ScenarioConfig,
    SimulationError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "hospital-beds",
    about = "Estimate the annual cost of a hospital bed allocation policy",
    version
)]
struct Cli {
    /// JSON scenario file; fields not present keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total number of beds in the hospital
    #[arg(long)]
    total_beds: Option<f64>,
    /// Initial fraction of beds assigned to COVID patients
    #[arg(long)]
    covid_beds_share: Option<f64>,
    /// Which class keeps its buffer: covid, normal or balanced
    #[arg(long)]
    priority: Option<PolicyPriority>,
    /// Guaranteed fraction of beds for COVID patients
    #[arg(long)]
    covid_buffer: Option<f64>,
    /// Guaranteed fraction of beds for normal patients
    #[arg(long)]
    normal_buffer: Option<f64>,
    /// Demand ratio rule: reference or proportional
    #[arg(long)]
    ratio: Option<DemandRatio>,
    /// Seed for a reproducible sample path
    #[arg(long)]
    seed: Option<u64>,
    /// Write the weekly trace to this CSV file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn scenario(&self) -> Result<ScenarioConfig, SimulationError> {
        let mut config = match &self.config {
            Some(path) => ScenarioConfig::from_json_file(path)?,
            None => ScenarioConfig::default(),
        };

        if let Some(total_beds) = self.total_beds {
            config.total_beds = total_beds;
        }
        if let Some(share) = self.covid_beds_share {
            config.covid_beds_share = share;
        }
        if let Some(priority) = self.priority {
            config.policy_priority = priority;
        }
        if let Some(buffer) = self.covid_buffer {
            config.policy_covid_buffer = buffer;
        }
        if let Some(buffer) = self.normal_buffer {
            config.policy_normal_buffer = buffer;
        }
        if let Some(ratio) = self.ratio {
            config.demand_ratio = ratio;
        }

        Ok(config)
    }
}

fn run(cli: Cli) -> Result<(), SimulationError> {
    telemetry::init(&cli.log_level)?;

    let config = cli.scenario()?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sim = BedSimulation::new(config, NormalSampler::new(rng))?;
    let cost = sim.run();

    if let Some(path) = &cli.trace {
        reporting::write_week_log(path, &sim.history)?;
    }

    println!("Expected annual cost: ${:.2}", cost);
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
