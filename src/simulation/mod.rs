use crate::calculations::PriorityIndex;
use crate::graph::DependencyGraph;
use std::collections::HashMap;
use thiserror::Error;

pub mod aggregate;
pub mod efficiency;
pub mod monte_carlo;
pub mod trial;

pub use aggregate::{PercentilePoint, TrialStatistics, percentile_index};
pub use efficiency::{SimulationParams, team_efficiency};
pub use monte_carlo::{TrialBatch, run_trials};
pub use trial::{TrialResult, simulate_trial};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid duration distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),
}

/// Read-only view of a repaired graph laid out for the day loop.
///
/// Every per-item vector is indexed by priority rank, so rank 0 is the item
/// claimed first when several are ready.
#[derive(Debug, Clone, Default)]
pub struct SimulationPlan {
    points: Vec<f64>,
    successors: Vec<Vec<usize>>,
    predecessor_counts: Vec<usize>,
    group_of: Vec<Option<usize>>,
    groups: Vec<String>,
}

impl SimulationPlan {
    /// `groups` lists the groups whose completion day is tracked per trial.
    pub fn new(dag: &DependencyGraph, priority: &PriorityIndex, groups: &[String]) -> Self {
        let group_slots: HashMap<&str, usize> = groups
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.as_str(), slot))
            .collect();

        let mut plan = SimulationPlan {
            groups: groups.to_vec(),
            ..Default::default()
        };

        for &ix in priority.order() {
            let node = dag.node(ix);
            let mut successors: Vec<usize> =
                dag.successors(ix).map(|s| priority.rank(s)).collect();
            successors.sort_unstable();

            plan.points.push(node.points);
            plan.successors.push(successors);
            plan.predecessor_counts.push(dag.predecessors(ix).count());
            plan.group_of.push(
                node.group
                    .as_deref()
                    .and_then(|g| group_slots.get(g).copied()),
            );
        }

        plan
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self, rank: usize) -> f64 {
        self.points[rank]
    }

    pub fn successors(&self, rank: usize) -> &[usize] {
        &self.successors[rank]
    }

    pub fn predecessor_count(&self, rank: usize) -> usize {
        self.predecessor_counts[rank]
    }

    pub fn group_of(&self, rank: usize) -> Option<usize> {
        self.group_of[rank]
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}
