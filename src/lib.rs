pub mod calculations;
pub mod calendar;
pub mod config;
pub mod estimate;
pub mod graph;
pub mod persistence;
pub mod simulation;
pub mod team_sweep;
pub mod work_item;
pub mod work_item_validation;

pub use calculations::{CriticalPath, CriticalPathPass, PriorityIndex};
pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::{ConfigError, EstimationConfig};
pub use estimate::{
    AggregateEstimate, EstimateError, Estimator, GroupEstimate, PreparedGraph, estimate,
};
pub use graph::{DependencyGraph, GraphBuilder, GraphError, RemovedEdge};
pub use simulation::{SimulationError, TrialBatch, TrialResult, team_efficiency};
pub use team_sweep::{TeamSweep, sweep_team_sizes};
pub use work_item::WorkItem;
pub use work_item_validation::{NormalizedItems, SkippedItem, normalize_items};
