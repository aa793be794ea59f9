// src/strategy/traits.rs

use crate::model::ward::ClassPair;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

/// Which patient class keeps its guaranteed buffer.
///
/// Each variant carries its own rule for resolving the configured buffers:
/// prioritising one class drops the other class's guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPriority {
    Covid,
    Normal,
    #[default]
    Balanced,
}

impl PolicyPriority {
    /// Returns the buffers that actually apply under this priority.
    pub fn resolve(self, buffers: ClassPair) -> ClassPair {
        match self {
            PolicyPriority::Covid => ClassPair::new(buffers.covid, 0.0),
            PolicyPriority::Normal => ClassPair::new(0.0, buffers.normal),
            PolicyPriority::Balanced => buffers,
        }
    }
}

impl fmt::Display for PolicyPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolicyPriority::Covid => "covid",
            PolicyPriority::Normal => "normal",
            PolicyPriority::Balanced => "balanced",
        };
        f.write_str(label)
    }
}

impl FromStr for PolicyPriority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "covid" => Ok(Self::Covid),
            "normal" => Ok(Self::Normal),
            "balanced" => Ok(Self::Balanced),
            other => Err(format!(
                "unknown policy priority '{other}' (expected covid, normal or balanced)"
            )),
        }
    }
}

/// Decides how the hospital's beds are split between the two patient classes.
///
/// Called once per simulated week with that week's sampled requests.
pub trait QuotaPolicy: Debug + Send + Sync {
    /// Returns the target `(covid, normal)` bed counts. The two always sum to `total_beds`.
    fn target_beds(&mut self, requests: ClassPair, total_beds: f64) -> ClassPair;

    /// Buffers in effect after priority resolution.
    fn buffers(&self) -> ClassPair;
}
