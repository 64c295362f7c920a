use crate::calculations::{CriticalPath, CriticalPathPass, PriorityIndex};
use crate::config::{ConfigError, EstimationConfig};
use crate::graph::{DependencyGraph, GraphBuilder, GraphError, RemovedEdge};
use crate::simulation::{
    SimulationError, SimulationParams, SimulationPlan, TrialBatch, TrialStatistics, run_trials,
};
use crate::work_item::WorkItem;
use crate::work_item_validation::{NormalizedItems, SkippedItem, normalize_items};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Deterministic, trial-invariant analysis of a set of work items.
///
/// Built once and reused for any number of runs (e.g. a team-size sweep).
#[derive(Debug, Clone)]
pub struct PreparedGraph {
    pub normalized: NormalizedItems,
    pub dag: DependencyGraph,
    pub cycles: Vec<Vec<String>>,
    pub removed_edges: Vec<RemovedEdge>,
    pub critical_path: CriticalPath,
    pub priority: PriorityIndex,
}

impl PreparedGraph {
    pub fn prepare<I>(items: I) -> Result<Self, EstimateError>
    where
        I: IntoIterator<Item = WorkItem>,
    {
        Self::from_normalized(normalize_items(items))
    }

    /// Prepares items that were already normalized, e.g. by
    /// `persistence::load_work_items_from_json`.
    pub fn from_normalized(normalized: NormalizedItems) -> Result<Self, EstimateError> {
        // Step 1: Build and repair the graph
        let built = GraphBuilder::new(&normalized.items).build()?;

        // Step 2: Deterministic analysis shared by every trial
        let critical_path = CriticalPathPass::new(&built.dag).execute()?;
        let priority = PriorityIndex::build(&built.dag);

        Ok(Self {
            normalized,
            dag: built.dag,
            cycles: built.repair.cycles,
            removed_edges: built.repair.removed_edges,
            critical_path,
            priority,
        })
    }

    fn group_summary(&self, group: &str) -> (usize, usize, f64, f64) {
        let members = self
            .normalized
            .items
            .values()
            .filter(|item| item.belongs_to(group));
        let (mut total, mut completed, mut remaining_points, mut completed_points) =
            (0, 0, 0.0, 0.0);
        for item in members {
            total += 1;
            if item.is_complete {
                completed += 1;
                completed_points += item.points;
            } else {
                remaining_points += item.points;
            }
        }
        (total, completed, remaining_points, completed_points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEstimate {
    pub group: String,
    pub total_items: usize,
    pub completed_items: usize,
    pub remaining_items: usize,
    pub remaining_points: f64,
    pub completed_points: f64,
    pub critical_path: CriticalPath,
    pub statistics: TrialStatistics,
}

/// Result of one estimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEstimate {
    pub seed: u64,
    pub trials: usize,
    pub team_size: f64,
    pub headcount: usize,
    pub team_efficiency: f64,
    /// Effective points per engineer per workday.
    pub daily_capacity: f64,
    pub start_date: NaiveDate,

    pub total_items: usize,
    pub completed_items: usize,
    pub remaining_items: usize,
    pub remaining_points: f64,
    pub completed_points: f64,

    pub critical_path: CriticalPath,
    /// Lower bound if the critical path were worked end to end.
    pub critical_path_workdays: f64,
    /// Lower bound if the whole team were always busy.
    pub parallel_workdays: f64,

    pub statistics: TrialStatistics,
    pub groups: Vec<GroupEstimate>,

    pub cycles: Vec<Vec<String>>,
    pub removed_edges: Vec<RemovedEdge>,
    pub skipped_items: Vec<SkippedItem>,
    pub truncated_trials: usize,
}

impl AggregateEstimate {
    pub fn group(&self, name: &str) -> Option<&GroupEstimate> {
        self.groups.iter().find(|g| g.group == name)
    }
}

/// Runs the Monte Carlo estimate of a prepared graph under one config.
pub struct Estimator<'a> {
    prepared: &'a PreparedGraph,
    config: &'a EstimationConfig,
}

impl<'a> Estimator<'a> {
    pub fn new(prepared: &'a PreparedGraph, config: &'a EstimationConfig) -> Self {
        Self { prepared, config }
    }

    pub fn execute(&self) -> Result<AggregateEstimate, EstimateError> {
        self.execute_with_trials().map(|(estimate, _)| estimate)
    }

    /// Like `execute`, also returning the raw per-trial outcomes.
    pub fn execute_with_trials(&self) -> Result<(AggregateEstimate, TrialBatch), EstimateError> {
        self.config.validate()?;
        let calendar = self.config.work_calendar()?;
        let start_date = self
            .config
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());
        let prepared = self.prepared;

        let groups = match &self.config.groups {
            Some(groups) => groups.clone(),
            None => prepared.normalized.groups(),
        };

        let params = SimulationParams::from_config(self.config);
        let plan = SimulationPlan::new(&prepared.dag, &prepared.priority, &groups);

        info!(
            items = plan.len(),
            groups = groups.len(),
            trials = self.config.trials,
            team_size = self.config.team_size,
            "starting estimate"
        );

        let batch = run_trials(&plan, &params, self.config.trials, self.config.seed)?;

        let statistics = TrialStatistics::from_workdays(batch.workdays(), &calendar, start_date);

        let mut group_estimates = Vec::with_capacity(groups.len());
        for (slot, group) in groups.iter().enumerate() {
            let subgraph = prepared.dag.group_subgraph(group);
            let critical_path = CriticalPathPass::new(&subgraph).execute()?;
            let (total, completed, remaining_points, completed_points) =
                prepared.group_summary(group);
            group_estimates.push(GroupEstimate {
                group: group.clone(),
                total_items: total,
                completed_items: completed,
                remaining_items: total - completed,
                remaining_points,
                completed_points,
                critical_path,
                statistics: TrialStatistics::from_workdays(
                    batch.group_workdays(slot),
                    &calendar,
                    start_date,
                ),
            });
        }

        let remaining_points = prepared.normalized.remaining_points();
        let estimate = AggregateEstimate {
            seed: batch.seed,
            trials: self.config.trials,
            team_size: self.config.team_size,
            headcount: params.headcount,
            team_efficiency: params.efficiency,
            daily_capacity: params.daily_capacity,
            start_date,
            total_items: prepared.normalized.items.len(),
            completed_items: prepared.normalized.completed_count(),
            remaining_items: prepared.normalized.remaining_count(),
            remaining_points,
            completed_points: prepared.normalized.completed_points(),
            critical_path: prepared.critical_path.clone(),
            critical_path_workdays: prepared.critical_path.points / params.daily_capacity,
            parallel_workdays: remaining_points / params.team_daily_capacity(),
            statistics,
            groups: group_estimates,
            cycles: prepared.cycles.clone(),
            removed_edges: prepared.removed_edges.clone(),
            skipped_items: prepared.normalized.skipped.clone(),
            truncated_trials: batch.truncated(),
        };

        info!(
            seed = estimate.seed,
            p50 = estimate.statistics.p50.workdays,
            p85 = estimate.statistics.p85.workdays,
            p95 = estimate.statistics.p95.workdays,
            "estimate finished"
        );

        Ok((estimate, batch))
    }
}

/// Validates `config`, prepares the graph and runs the estimate.
pub fn estimate<I>(items: I, config: &EstimationConfig) -> Result<AggregateEstimate, EstimateError>
where
    I: IntoIterator<Item = WorkItem>,
{
    config.validate()?;
    let prepared = PreparedGraph::prepare(items)?;
    Estimator::new(&prepared, config).execute()
}
