// src/simulation/engine.rs

use crate::error::SimulationError;
use crate::io::sampling::DemandSampler;
use crate::model::ward::{ClassPair, PatientClass, WardState};
use crate::simulation::config::{ScenarioConfig, WEEKS_PER_YEAR};
use crate::strategy::traits::QuotaPolicy;
use serde::Serialize;
use tracing::{debug, info};

// Serialize so the trace can be written to CSV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRecord {
    pub week: usize,
    pub covid_discharges: f64,
    pub normal_discharges: f64,
    pub covid_requests: f64,
    pub normal_requests: f64,
    pub covid_beds: f64,
    pub normal_beds: f64,
    pub covid_inpatients: f64,
    pub normal_inpatients: f64,
    pub week_cost: f64,
    pub cumulative_cost: f64,
}

/// One hospital scenario stepped through a year, one week at a time.
pub struct BedSimulation<S: DemandSampler> {
    config: ScenarioConfig,

    pub ward: WardState,

    // Decides the bed split at the end of every week
    policy: Box<dyn QuotaPolicy>,
    sampler: S,

    pub current_week: usize,
    cumulative_cost: f64,
    pub history: Vec<WeekRecord>,
}

impl<S: DemandSampler> BedSimulation<S> {
    /// Builds a simulation using the quota policy described by `config`.
    pub fn new(config: ScenarioConfig, sampler: S) -> Result<Self, SimulationError> {
        config.validate()?;
        let policy = Box::new(config.quota_policy());
        Ok(Self::assemble(config, policy, sampler))
    }

    /// Builds a simulation around a caller-supplied quota policy.
    pub fn with_policy(
        config: ScenarioConfig,
        policy: Box<dyn QuotaPolicy>,
        sampler: S,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self::assemble(config, policy, sampler))
    }

    fn assemble(config: ScenarioConfig, policy: Box<dyn QuotaPolicy>, sampler: S) -> Self {
        let ward = WardState::new(
            config.total_beds,
            config.clamped_covid_share(),
            config.initial_inpatients,
        );

        Self {
            config,
            ward,
            policy,
            sampler,
            current_week: 1,
            cumulative_cost: 0.0,
            history: Vec::with_capacity(WEEKS_PER_YEAR),
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn policy(&self) -> &dyn QuotaPolicy {
        self.policy.as_ref()
    }

    pub fn cumulative_cost(&self) -> f64 {
        self.cumulative_cost
    }

    /// Runs the remaining weeks of the year and returns the total cost.
    pub fn run(&mut self) -> f64 {
        info!(
            total_beds = self.config.total_beds,
            priority = %self.config.policy_priority,
            covid_buffer = self.config.policy_covid_buffer,
            normal_buffer = self.config.policy_normal_buffer,
            "starting annual cycle"
        );

        while self.current_week <= WEEKS_PER_YEAR {
            self.step();
        }

        info!(cost = self.cumulative_cost, "annual cycle complete");
        self.cumulative_cost
    }

    /// Advances the scenario by one week.
    pub fn step(&mut self) {
        let mut week_cost = 0.0;
        let noise = self.config.noise_std_dev;

        // =================================================================
        // PHASE 1: Discharges
        // =================================================================
        let mut discharges = ClassPair::default();
        for class in PatientClass::ALL {
            let mean = self.config.discharge_rate.get(class);
            let sampled = self.sampler.sample(mean, noise).max(0.0);
            *discharges.get_mut(class) = self.ward.discharge(class, sampled);
        }

        // =================================================================
        // PHASE 2: Arrivals (denial of service when a pool is full)
        // =================================================================
        let mut requests = ClassPair::default();
        for class in PatientClass::ALL {
            let mean = self.config.requests.get(class);
            *requests.get_mut(class) = self.sampler.sample(mean, noise).max(0.0);
        }
        for class in PatientClass::ALL {
            let denied = self.ward.admit(class, requests.get(class));
            if denied > 0.0 {
                week_cost += self.charge(denied * self.dos_cost(class));
            }
        }

        // =================================================================
        // PHASE 3: Reallocation
        // =================================================================
        let target = self.policy.target_beds(requests, self.config.total_beds);
        let outcome = self.ward.reallocate(target);
        for class in PatientClass::ALL {
            let added = outcome.added.get(class);
            if added > 0.0 {
                week_cost += self.charge(self.conversion_cost(class) * added);
            }
            let displaced = outcome.displaced.get(class);
            if displaced > 0.0 {
                week_cost += self.charge(self.dos_cost(class) * displaced);
            }
        }

        // =================================================================
        // PHASE 4: Record & advance
        // =================================================================
        debug!(
            week = self.current_week,
            covid_beds = self.ward.beds.covid,
            normal_beds = self.ward.beds.normal,
            covid_inpatients = self.ward.inpatients.covid,
            normal_inpatients = self.ward.inpatients.normal,
            week_cost,
            "week simulated"
        );
        self.record_week(discharges, requests, week_cost);
        self.current_week += 1;
    }

    fn charge(&mut self, amount: f64) -> f64 {
        self.cumulative_cost += amount;
        amount
    }

    fn dos_cost(&self, class: PatientClass) -> f64 {
        match class {
            PatientClass::Covid => self.config.dos_covid_cost,
            PatientClass::Normal => self.config.dos_normal_cost,
        }
    }

    fn conversion_cost(&self, class: PatientClass) -> f64 {
        match class {
            PatientClass::Covid => self.config.covid_conversion_cost,
            PatientClass::Normal => self.config.normal_conversion_cost,
        }
    }

    fn record_week(&mut self, discharges: ClassPair, requests: ClassPair, week_cost: f64) {
        self.history.push(WeekRecord {
            week: self.current_week,
            covid_discharges: discharges.covid,
            normal_discharges: discharges.normal,
            covid_requests: requests.covid,
            normal_requests: requests.normal,
            covid_beds: self.ward.beds.covid,
            normal_beds: self.ward.beds.normal,
            covid_inpatients: self.ward.inpatients.covid,
            normal_inpatients: self.ward.inpatients.normal,
            week_cost,
            cumulative_cost: self.cumulative_cost,
        });
    }
}

/// Runs one full year for `config` and returns its cumulative cost.
pub fn run_annual_cycle<S: DemandSampler>(
    config: ScenarioConfig,
    sampler: S,
) -> Result<f64, SimulationError> {
    let mut simulation = BedSimulation::new(config, sampler)?;
    Ok(simulation.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sampling::{MeanSampler, ScriptedSampler};
    use crate::strategy::traits::PolicyPriority;

    fn covid_first() -> ScenarioConfig {
        ScenarioConfig {
            covid_beds_share: 0.9,
            policy_priority: PolicyPriority::Covid,
            policy_covid_buffer: 0.9,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn runs_exactly_one_year() {
        let mut sim = BedSimulation::new(ScenarioConfig::default(), MeanSampler).unwrap();
        sim.run();
        assert_eq!(sim.history.len(), WEEKS_PER_YEAR);
        assert_eq!(sim.history.last().unwrap().week, 53);
    }

    #[test]
    fn second_run_does_not_advance() {
        let mut sim = BedSimulation::new(ScenarioConfig::default(), MeanSampler).unwrap();
        let first = sim.run();
        let second = sim.run();
        assert_eq!(first, second);
        assert_eq!(sim.history.len(), WEEKS_PER_YEAR);
    }

    #[test]
    fn first_week_of_covid_priority_scenario() {
        let mut sim = BedSimulation::new(covid_first(), MeanSampler).unwrap();
        sim.step();

        let week = &sim.history[0];
        // 3600 normal patients turned away, 100 covid beds converted,
        // 100 normal patients displaced by the shrinking pool.
        let expected = 3600.0 * 1000.0 + 100.0 * 5000.0 + 100.0 * 1000.0;
        assert!((week.week_cost - expected).abs() < 1e-3, "{}", week.week_cost);
        assert!((week.covid_beds - 3700.0).abs() < 1e-6);
        assert!((week.normal_inpatients - 300.0).abs() < 1e-6);
    }

    #[test]
    fn covid_priority_scenario_is_pinned() {
        let cost = run_annual_cycle(covid_first(), MeanSampler).unwrap();
        assert!((cost - 196_600_000.0).abs() < 1e-3, "{cost}");
    }

    #[test]
    fn default_scenario_is_pinned() {
        let cost = run_annual_cycle(ScenarioConfig::default(), MeanSampler).unwrap();
        assert!((cost - 78_000_000.0).abs() < 1e-3, "{cost}");
    }

    #[test]
    fn negative_draws_are_clamped_to_zero() {
        // Discharges and requests all drawn negative in week 1.
        let sampler = ScriptedSampler::new([-50.0, -50.0, -50.0, -50.0]);
        let mut sim = BedSimulation::new(ScenarioConfig::default(), sampler).unwrap();
        sim.step();

        let week = &sim.history[0];
        assert_eq!(week.covid_discharges, 0.0);
        assert_eq!(week.normal_discharges, 0.0);
        assert_eq!(week.covid_requests, 0.0);
        assert_eq!(week.normal_requests, 0.0);
    }

    #[test]
    fn zero_request_week_keeps_previous_split() {
        // Initial split is all-normal; a week with no requests leaves the ratio undefined.
        let sampler = ScriptedSampler::new([0.0, 0.0, 0.0, 0.0]);
        let mut sim = BedSimulation::new(ScenarioConfig::default(), sampler).unwrap();
        sim.step();

        assert_eq!(sim.ward.beds, ClassPair::new(0.0, 4000.0));
        assert_eq!(sim.cumulative_cost(), 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScenarioConfig {
            total_beds: -1.0,
            ..ScenarioConfig::default()
        };
        assert!(BedSimulation::new(config, MeanSampler).is_err());
    }
}
