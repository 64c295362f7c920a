use super::{SimulationError, SimulationParams, SimulationPlan, TrialResult, simulate_trial};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::Normal;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Every trial of one Monte Carlo run, in trial order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBatch {
    pub trials: Vec<TrialResult>,
    /// Base seed actually used; trial `i` ran with `seed + i`.
    pub seed: u64,
}

impl TrialBatch {
    pub fn truncated(&self) -> usize {
        self.trials.iter().filter(|t| t.hit_horizon).count()
    }

    pub fn workdays(&self) -> Vec<u32> {
        self.trials.iter().map(|t| t.workdays).collect()
    }

    pub fn group_workdays(&self, slot: usize) -> Vec<u32> {
        self.trials.iter().map(|t| t.group_workdays[slot]).collect()
    }
}

/// Runs `trials` independent trials in parallel.
///
/// Each trial owns its RNG, seeded from the base seed plus the trial index,
/// so results do not depend on thread scheduling.
pub fn run_trials(
    plan: &SimulationPlan,
    params: &SimulationParams,
    trials: usize,
    seed: Option<u64>,
) -> Result<TrialBatch, SimulationError> {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());

    let duration_noise = if params.variance > 0.0 {
        Some(Normal::new(1.0, params.variance)?)
    } else {
        None
    };

    let results: Vec<TrialResult> = (0..trials as u64)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i));
            simulate_trial(plan, params, duration_noise.as_ref(), &mut rng)
        })
        .collect();

    let batch = TrialBatch {
        trials: results,
        seed,
    };

    let truncated = batch.truncated();
    if truncated > 0 {
        warn!(
            truncated,
            max_workdays = params.max_workdays,
            "trials stopped at the workday horizon"
        );
    }
    debug!(trials, seed, items = plan.len(), "monte carlo batch finished");

    Ok(batch)
}
