// src/strategy/implementations.rs

use crate::model::ward::ClassPair;
use crate::strategy::traits::{PolicyPriority, QuotaPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

// =========================================================================
// 1. Demand Ratio Rules
// =========================================================================

/// How weekly requests are turned into the demand-driven part of the COVID share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandRatio {
    /// `covid / normal`, the literal ratio of the two request streams.
    /// This is not a share of the total and can exceed 1.
    #[default]
    Reference,
    /// `covid / (covid + normal)`, the COVID fraction of all requests.
    Proportional,
}

impl DemandRatio {
    /// Returns `None` when the ratio is undefined for these requests.
    pub fn evaluate(self, requests: ClassPair) -> Option<f64> {
        let denominator = match self {
            DemandRatio::Reference => requests.normal,
            DemandRatio::Proportional => requests.total(),
        };
        if denominator <= 0.0 {
            return None;
        }
        let ratio = requests.covid / denominator;
        ratio.is_finite().then_some(ratio)
    }
}

impl fmt::Display for DemandRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandRatio::Reference => f.write_str("reference"),
            DemandRatio::Proportional => f.write_str("proportional"),
        }
    }
}

impl FromStr for DemandRatio {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "proportional" => Ok(Self::Proportional),
            other => Err(format!(
                "unknown demand ratio '{other}' (expected reference or proportional)"
            )),
        }
    }
}

// =========================================================================
// 2. Buffered Quota Policy
// =========================================================================

/// Reserves a guaranteed share of beds for each class and hands the rest
/// out according to the demand ratio.
///
/// Formula: CovidShare = CovidBuffer + (1 - CovidBuffer - NormalBuffer) * Ratio
///
/// Buffers that sum to more than 1 leave a negative variable pool. That is
/// not clamped, so targets can go negative.
#[derive(Debug, Clone)]
pub struct BufferedQuotaPolicy {
    priority: PolicyPriority,
    buffers: ClassPair,
    ratio: DemandRatio,
    covid_share: f64, // Last share handed out; reused when the ratio is undefined
}

impl BufferedQuotaPolicy {
    pub fn new(
        priority: PolicyPriority,
        buffers: ClassPair,
        ratio: DemandRatio,
        initial_covid_share: f64,
    ) -> Self {
        let buffers = priority.resolve(buffers);
        let variable_pool = 1.0 - buffers.covid - buffers.normal;
        if variable_pool < 0.0 {
            warn!(
                covid_buffer = buffers.covid,
                normal_buffer = buffers.normal,
                variable_pool,
                "policy buffers exceed the whole bed pool"
            );
        }

        Self {
            priority,
            buffers,
            ratio,
            covid_share: initial_covid_share,
        }
    }

    pub fn priority(&self) -> PolicyPriority {
        self.priority
    }

    /// Share of beds assigned to COVID by the most recent evaluation.
    pub fn covid_share(&self) -> f64 {
        self.covid_share
    }
}

impl QuotaPolicy for BufferedQuotaPolicy {
    fn target_beds(&mut self, requests: ClassPair, total_beds: f64) -> ClassPair {
        let variable_pool = 1.0 - self.buffers.covid - self.buffers.normal;

        match self.ratio.evaluate(requests) {
            Some(ratio) => self.covid_share = self.buffers.covid + variable_pool * ratio,
            None => warn!(
                covid_requests = requests.covid,
                normal_requests = requests.normal,
                covid_share = self.covid_share,
                "demand ratio undefined, keeping previous bed split"
            ),
        }

        let covid_beds = self.covid_share * total_beds;
        let normal_beds = total_beds - covid_beds;

        if covid_beds < 0.0 || normal_beds < 0.0 {
            warn!(covid_beds, normal_beds, "negative bed target");
        }

        ClassPair::new(covid_beds, normal_beds)
    }

    fn buffers(&self) -> ClassPair {
        self.buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: f64 = 4000.0;

    fn policy(priority: PolicyPriority, covid: f64, normal: f64) -> BufferedQuotaPolicy {
        BufferedQuotaPolicy::new(
            priority,
            ClassPair::new(covid, normal),
            DemandRatio::Reference,
            0.0,
        )
    }

    #[test]
    fn balanced_without_buffers_uses_raw_ratio() {
        let mut policy = policy(PolicyPriority::Balanced, 0.0, 0.0);
        for requests in [
            ClassPair::new(1000.0, 4000.0),
            ClassPair::new(2500.0, 1250.0),
            ClassPair::new(0.0, 10.0),
        ] {
            let target = policy.target_beds(requests, TOTAL);
            let expected = requests.covid / requests.normal;
            assert!((policy.covid_share() - expected).abs() < 1e-12);
            assert!((target.covid - expected * TOTAL).abs() < 1e-9);
        }
    }

    #[test]
    fn targets_always_sum_to_total() {
        let mut policy = policy(PolicyPriority::Balanced, 0.3, 0.2);
        let target = policy.target_beds(ClassPair::new(1234.5, 3210.0), TOTAL);
        assert!((target.total() - TOTAL).abs() < 1e-9);
    }

    #[test]
    fn covid_priority_drops_normal_buffer() {
        let policy = policy(PolicyPriority::Covid, 0.9, 0.4);
        assert_eq!(policy.buffers(), ClassPair::new(0.9, 0.0));
    }

    #[test]
    fn normal_priority_drops_covid_buffer() {
        let policy = policy(PolicyPriority::Normal, 0.9, 0.4);
        assert_eq!(policy.buffers(), ClassPair::new(0.0, 0.4));
    }

    #[test]
    fn buffer_zeroing_persists_across_evaluations() {
        let mut policy = policy(PolicyPriority::Covid, 0.5, 0.3);
        for week in 0..10 {
            policy.target_beds(ClassPair::new(100.0 * week as f64, 4000.0), TOTAL);
            assert_eq!(policy.buffers().normal, 0.0);
        }
    }

    #[test]
    fn covid_buffer_pins_most_beds() {
        let mut policy = policy(PolicyPriority::Covid, 0.9, 0.0);
        let target = policy.target_beds(ClassPair::new(1000.0, 4000.0), TOTAL);
        // 0.9 + 0.1 * 0.25
        assert!((target.covid - 3700.0).abs() < 1e-6);
        assert!((target.normal - 300.0).abs() < 1e-6);
    }

    #[test]
    fn overcommitted_buffers_produce_negative_targets() {
        let mut policy = policy(PolicyPriority::Balanced, 0.8, 0.8);
        let target = policy.target_beds(ClassPair::new(4000.0, 1000.0), TOTAL);
        // 0.8 + (-0.6 * 4.0) = -1.6
        assert!(target.covid < 0.0);
        assert!((target.total() - TOTAL).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_keeps_previous_share() {
        let mut policy = policy(PolicyPriority::Balanced, 0.0, 0.0);
        policy.target_beds(ClassPair::new(1000.0, 4000.0), TOTAL);

        let target = policy.target_beds(ClassPair::new(1000.0, 0.0), TOTAL);
        assert_eq!(policy.covid_share(), 0.25);
        assert_eq!(target, ClassPair::new(1000.0, 3000.0));
    }

    #[test]
    fn zero_covid_requests_leave_only_the_buffer() {
        let mut policy = policy(PolicyPriority::Balanced, 0.1, 0.2);
        let target = policy.target_beds(ClassPair::new(0.0, 4000.0), TOTAL);
        assert!((target.covid - 400.0).abs() < 1e-9);
    }

    #[test]
    fn proportional_ratio_stays_within_pool() {
        let mut policy = BufferedQuotaPolicy::new(
            PolicyPriority::Balanced,
            ClassPair::new(0.0, 0.0),
            DemandRatio::Proportional,
            0.0,
        );
        let target = policy.target_beds(ClassPair::new(1000.0, 4000.0), TOTAL);
        assert!((target.covid - 800.0).abs() < 1e-9);
    }

    #[test]
    fn proportional_ratio_guards_empty_demand() {
        assert_eq!(DemandRatio::Proportional.evaluate(ClassPair::default()), None);
        assert_eq!(DemandRatio::Reference.evaluate(ClassPair::new(5.0, 0.0)), None);
    }

    #[test]
    fn parses_labels() {
        assert_eq!("Covid".parse::<PolicyPriority>(), Ok(PolicyPriority::Covid));
        assert_eq!(" balanced ".parse::<PolicyPriority>(), Ok(PolicyPriority::Balanced));
        assert!("triage".parse::<PolicyPriority>().is_err());
        assert_eq!("proportional".parse::<DemandRatio>(), Ok(DemandRatio::Proportional));
    }
}
