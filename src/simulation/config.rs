// src/simulation/config.rs

use crate::error::SimulationError;
use crate::model::ward::ClassPair;
use crate::strategy::implementations::{BufferedQuotaPolicy, DemandRatio};
use crate::strategy::traits::PolicyPriority;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Length of one annual cycle in weeks.
pub const WEEKS_PER_YEAR: usize = 53;

/// Parameters of one hospital scenario.
///
/// Every field has a default, so a JSON scenario file only needs the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub population: f64,
    pub total_beds: f64,
    /// Mean weekly admission requests.
    pub requests: ClassPair,
    /// Mean weekly discharges.
    pub discharge_rate: ClassPair,
    /// Initial fraction of beds assigned to COVID. Clamped to [0, 1].
    pub covid_beds_share: f64,
    pub covid_conversion_cost: f64,
    pub normal_conversion_cost: f64,
    // Mortality and value of life are carried for callers but not priced yet.
    pub covid_mortality: f64,
    pub normal_mortality: f64,
    pub value_of_life: f64,
    pub dos_covid_cost: f64,
    pub dos_normal_cost: f64,
    /// Occupancy at week 0. Raised to the size of each pool if lower.
    pub initial_inpatients: ClassPair,
    pub policy_priority: PolicyPriority,
    pub policy_covid_buffer: f64,
    pub policy_normal_buffer: f64,
    pub demand_ratio: DemandRatio,
    /// Standard deviation of every weekly discharge and arrival draw.
    pub noise_std_dev: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            population: 5_000_000.0,
            total_beds: 4000.0,
            requests: ClassPair::new(1000.0, 4000.0),
            discharge_rate: ClassPair::new(1000.0, 4000.0),
            covid_beds_share: 0.0,
            covid_conversion_cost: 5000.0,
            normal_conversion_cost: 0.0,
            covid_mortality: 0.0117,
            normal_mortality: 0.0001,
            value_of_life: 500_000.0,
            dos_covid_cost: 20_000.0,
            dos_normal_cost: 1000.0,
            initial_inpatients: ClassPair::default(),
            policy_priority: PolicyPriority::Balanced,
            policy_covid_buffer: 0.0,
            policy_normal_buffer: 0.0,
            demand_ratio: DemandRatio::Reference,
            noise_std_dev: 1000.0,
        }
    }
}

/// Testing figures used to derive weekly demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestingData {
    pub covid_tests: f64,
    pub test_positivity_rate: f64,
    pub normal_requests: f64,
}

impl Default for TestingData {
    fn default() -> Self {
        Self {
            covid_tests: 5000.0,
            test_positivity_rate: 0.1,
            normal_requests: 4000.0,
        }
    }
}

impl ScenarioConfig {
    /// Reads a JSON scenario. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SimulationError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SimulationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn clamped_covid_share(&self) -> f64 {
        self.covid_beds_share.clamp(0.0, 1.0)
    }

    /// Re-derives weekly requests from testing volume.
    ///
    /// COVID requests become `tests * positivity`; discharge rates are untouched.
    pub fn tune_from_testing(&mut self, population: f64, testing: TestingData) {
        self.population = population;
        self.requests = ClassPair::new(
            testing.covid_tests * testing.test_positivity_rate,
            testing.normal_requests,
        );
    }

    /// Builds the quota policy described by this scenario.
    pub fn quota_policy(&self) -> BufferedQuotaPolicy {
        BufferedQuotaPolicy::new(
            self.policy_priority,
            ClassPair::new(self.policy_covid_buffer, self.policy_normal_buffer),
            self.demand_ratio,
            self.clamped_covid_share(),
        )
    }

    /// Rejects values that would break the cost model.
    ///
    /// All prices must be non-negative so the running cost never decreases.
    pub fn validate(&self) -> Result<(), SimulationError> {
        non_negative("population", self.population)?;
        non_negative("total_beds", self.total_beds)?;
        non_negative("requests.covid", self.requests.covid)?;
        non_negative("requests.normal", self.requests.normal)?;
        non_negative("discharge_rate.covid", self.discharge_rate.covid)?;
        non_negative("discharge_rate.normal", self.discharge_rate.normal)?;
        finite("covid_beds_share", self.covid_beds_share)?;
        non_negative("covid_conversion_cost", self.covid_conversion_cost)?;
        non_negative("normal_conversion_cost", self.normal_conversion_cost)?;
        non_negative("dos_covid_cost", self.dos_covid_cost)?;
        non_negative("dos_normal_cost", self.dos_normal_cost)?;
        finite("covid_mortality", self.covid_mortality)?;
        finite("normal_mortality", self.normal_mortality)?;
        finite("value_of_life", self.value_of_life)?;
        finite("initial_inpatients.covid", self.initial_inpatients.covid)?;
        finite("initial_inpatients.normal", self.initial_inpatients.normal)?;
        fraction("policy_covid_buffer", self.policy_covid_buffer)?;
        fraction("policy_normal_buffer", self.policy_normal_buffer)?;
        non_negative("noise_std_dev", self.noise_std_dev)?;
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), SimulationError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(SimulationError::InvalidParameter {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}

fn fraction(name: &'static str, value: f64) -> Result<(), SimulationError> {
    finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::InvalidParameter {
            name,
            value,
            reason: "must lie between 0 and 1",
        });
    }
    Ok(())
}
