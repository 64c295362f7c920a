use crate::config::{ConfigError, EstimationConfig};
use crate::estimate::{EstimateError, Estimator, PreparedGraph};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::info;

/// Improvement below this percentage marks the point of diminishing returns.
const IMPROVEMENT_THRESHOLD_PCT: f64 = 5.0;
/// Fallback: the first team whose p50 is within this factor of the lower bound.
const CRITICAL_PATH_BUFFER: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSizePoint {
    pub team_size: u32,
    pub p50_workdays: u32,
    pub p85_workdays: u32,
    pub brooks_efficiency: f64,
    /// Remaining points over what the team could deliver in p50 workdays
    /// at nominal capacity.
    pub throughput_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSaving {
    pub from_team_size: u32,
    pub to_team_size: u32,
    pub workdays_saved: i64,
    pub percent_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSweep {
    pub seed: u64,
    pub points: Vec<TeamSizePoint>,
    pub savings: Vec<TimeSaving>,
    /// Critical path points at one engineer's nominal capacity.
    pub critical_path_workdays: f64,
    pub optimal_team_size: u32,
}

/// Estimates each team size in `sizes` against the same prepared graph and
/// seed, then picks the size past which adding engineers stops paying off.
pub fn sweep_team_sizes(
    prepared: &PreparedGraph,
    base: &EstimationConfig,
    sizes: RangeInclusive<u32>,
) -> Result<TeamSweep, EstimateError> {
    if sizes.is_empty() || *sizes.start() == 0 {
        return Err(ConfigError::invalid(
            "team_sizes",
            "range must be non-empty and start at 1 or more",
        )
        .into());
    }
    base.validate()?;

    let seed = base.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    let nominal_capacity = base.daily_capacity();
    let remaining_points = prepared.normalized.remaining_points();

    let mut points = Vec::new();
    for team_size in sizes {
        let config = base
            .clone()
            .with_team_size(f64::from(team_size))
            .with_seed(seed);
        let estimate = Estimator::new(prepared, &config).execute()?;

        let p50 = estimate.statistics.p50.workdays;
        let delivered = f64::from(team_size) * nominal_capacity * f64::from(p50);
        let throughput_efficiency = if delivered > 0.0 {
            remaining_points / delivered
        } else {
            0.0
        };

        info!(team_size, p50, "team size evaluated");
        points.push(TeamSizePoint {
            team_size,
            p50_workdays: p50,
            p85_workdays: estimate.statistics.p85.workdays,
            brooks_efficiency: estimate.team_efficiency,
            throughput_efficiency,
        });
    }

    let savings: Vec<TimeSaving> = points
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            let saved = i64::from(prev.p50_workdays) - i64::from(curr.p50_workdays);
            let percent_improvement = if prev.p50_workdays > 0 {
                saved as f64 / f64::from(prev.p50_workdays) * 100.0
            } else {
                0.0
            };
            TimeSaving {
                from_team_size: prev.team_size,
                to_team_size: curr.team_size,
                workdays_saved: saved,
                percent_improvement,
            }
        })
        .collect();

    let critical_path_workdays = prepared.critical_path.points / nominal_capacity;
    let optimal_team_size = pick_optimal(&points, &savings, critical_path_workdays);

    Ok(TeamSweep {
        seed,
        points,
        savings,
        critical_path_workdays,
        optimal_team_size,
    })
}

fn pick_optimal(points: &[TeamSizePoint], savings: &[TimeSaving], critical_path_workdays: f64) -> u32 {
    if let Some(knee) = savings
        .iter()
        .find(|s| s.percent_improvement < IMPROVEMENT_THRESHOLD_PCT)
    {
        return knee.from_team_size;
    }

    let target = critical_path_workdays * CRITICAL_PATH_BUFFER;
    if let Some(close) = points
        .iter()
        .find(|p| f64::from(p.p50_workdays) <= target)
    {
        return close.team_size;
    }

    points
        .get(points.len() / 2)
        .map(|p| p.team_size)
        .unwrap_or(1)
}
