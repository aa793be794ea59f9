//! Hospital bed allocation under COVID and non-COVID demand.
//!
//! A scenario splits a fixed bed pool between two patient classes and is
//! stepped through a 53-week year. Each week patients are discharged, new
//! requests arrive (turned-away patients are charged as denial of service),
//! and a quota policy moves beds between the classes, paying conversion
//! costs and displacing patients when an occupied pool shrinks.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;
pub mod telemetry;

pub use error::SimulationError;
pub use io::sampling::{DemandSampler, MeanSampler, NormalSampler, ScriptedSampler};
pub use model::ward::{ClassPair, PatientClass, Reallocation, WardState};
pub use simulation::config::{ScenarioConfig, TestingData, WEEKS_PER_YEAR};
pub use simulation::engine::{run_annual_cycle, BedSimulation, WeekRecord};
pub use strategy::implementations::{BufferedQuotaPolicy, DemandRatio};
pub use strategy::traits::{PolicyPriority, QuotaPolicy};
