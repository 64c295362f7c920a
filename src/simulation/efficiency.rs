use crate::config::EstimationConfig;
use serde::{Deserialize, Serialize};

/// Per-engineer productivity for a team of `team_size` (Brooks's law).
///
/// `1 / (1 + c * log2(n))`, and exactly 1.0 for teams of one or fewer.
pub fn team_efficiency(team_size: f64, coordination_factor: f64) -> f64 {
    if team_size <= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + coordination_factor * team_size.log2())
}

/// Trial-invariant numbers derived from a validated config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub headcount: usize,
    /// Points one engineer completes per workday after the efficiency penalty.
    pub daily_capacity: f64,
    pub efficiency: f64,
    pub variance: f64,
    pub min_duration_multiplier: f64,
    pub max_workdays: u32,
}

impl SimulationParams {
    pub fn from_config(config: &EstimationConfig) -> Self {
        let efficiency = team_efficiency(config.team_size, config.coordination_factor);
        Self {
            headcount: config.headcount(),
            daily_capacity: config.daily_capacity() * efficiency,
            efficiency,
            variance: config.variance,
            min_duration_multiplier: config.min_duration_multiplier,
            max_workdays: config.max_workdays,
        }
    }

    pub fn team_daily_capacity(&self) -> f64 {
        self.daily_capacity * self.headcount as f64
    }
}
