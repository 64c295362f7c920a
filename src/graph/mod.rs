use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("dependency graph contains a cycle through {key}")]
    CycleDetected { key: String },
    #[error("dependency graph still contains a cycle after removing {removed} edges")]
    UnresolvedCycle { removed: usize },
}

pub mod builder;
pub mod cycles;
pub mod dependency_dag;

pub use builder::{BuiltGraph, GraphBuilder};
pub use cycles::{CycleRepair, RemovedEdge, repair_cycles, simple_cycles};
pub use dependency_dag::{DependencyGraph, GraphNode};
