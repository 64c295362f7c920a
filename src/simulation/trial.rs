use super::{SimulationParams, SimulationPlan};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const EPS: f64 = 1e-9;

/// Outcome of one simulated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub workdays: u32,
    /// Day the last item of each tracked group completed, 0 for groups with
    /// no remaining work. Same order as `SimulationPlan::groups`.
    pub group_workdays: Vec<u32>,
    pub hit_horizon: bool,
}

/// Runs one trial to completion (or to `max_workdays`).
///
/// Each day idle engineers first claim the highest-priority ready items. Each
/// busy engineer then spends the day's capacity; finishing an item mid-day
/// frees its successors and the leftover capacity goes to a fresh claim.
/// Engineers that found nothing to claim at the start of the day stay idle.
pub fn simulate_trial<R: Rng + ?Sized>(
    plan: &SimulationPlan,
    params: &SimulationParams,
    duration_noise: Option<&Normal<f64>>,
    rng: &mut R,
) -> TrialResult {
    let n = plan.len();
    let group_count = plan.groups().len();
    if n == 0 {
        return TrialResult {
            workdays: 0,
            group_workdays: vec![0; group_count],
            hit_horizon: false,
        };
    }

    let mut remaining: Vec<f64> = (0..n)
        .map(|rank| {
            let multiplier = match duration_noise {
                Some(normal) => normal.sample(&mut *rng).max(params.min_duration_multiplier),
                None => 1.0,
            };
            plan.points(rank) * multiplier
        })
        .collect();

    let mut unmet: Vec<usize> = (0..n).map(|rank| plan.predecessor_count(rank)).collect();
    let mut ready: BTreeSet<usize> = (0..n).filter(|&rank| unmet[rank] == 0).collect();
    let mut finished_on: Vec<Option<u32>> = vec![None; n];
    let mut engineers: Vec<Option<usize>> = vec![None; params.headcount.clamp(1, n)];
    let mut completed = 0usize;
    let mut day = 0u32;
    let mut hit_horizon = false;

    while completed < n {
        if day >= params.max_workdays {
            hit_horizon = true;
            break;
        }
        day += 1;

        for slot in engineers.iter_mut().filter(|slot| slot.is_none()) {
            *slot = ready.pop_first();
        }

        for slot in engineers.iter_mut() {
            let mut budget = params.daily_capacity;
            while let Some(rank) = *slot {
                let spent = budget.min(remaining[rank]);
                remaining[rank] -= spent;
                budget -= spent;

                if remaining[rank] > EPS {
                    break;
                }

                finished_on[rank] = Some(day);
                completed += 1;
                for &next in plan.successors(rank) {
                    unmet[next] -= 1;
                    if unmet[next] == 0 {
                        ready.insert(next);
                    }
                }

                *slot = if budget > EPS { ready.pop_first() } else { None };
            }
        }
    }

    let mut group_workdays = vec![0u32; group_count];
    for (rank, finished) in finished_on.iter().enumerate() {
        if let Some(slot) = plan.group_of(rank) {
            let finished = finished.unwrap_or(day);
            group_workdays[slot] = group_workdays[slot].max(finished);
        }
    }

    TrialResult {
        workdays: day,
        group_workdays,
        hit_horizon,
    }
}
