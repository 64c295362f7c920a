use crate::graph::{DependencyGraph, GraphError};
use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Sum of points along the path, including the last node.
    pub points: f64,
    pub keys: Vec<String>,
}

impl CriticalPath {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Longest points-weighted chain through an acyclic dependency graph.
pub struct CriticalPathPass<'a> {
    dag: &'a DependencyGraph,
}

impl<'a> CriticalPathPass<'a> {
    pub fn new(dag: &'a DependencyGraph) -> Self {
        Self { dag }
    }

    pub fn execute(&self) -> Result<CriticalPath, GraphError> {
        if self.dag.is_empty() {
            return Ok(CriticalPath::default());
        }

        let order = toposort(&self.dag.graph, None).map_err(|cycle| GraphError::CycleDetected {
            key: self.dag.key(cycle.node_id()).to_string(),
        })?;

        let mut longest: HashMap<NodeIndex, f64> = HashMap::with_capacity(order.len());
        let mut best_pred: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for &node_ix in &order {
            let mut preds: Vec<NodeIndex> = self.dag.predecessors(node_ix).collect();
            preds.sort();

            // First maximal predecessor in index (key) order wins ties
            let mut chosen: Option<(NodeIndex, f64)> = None;
            for pred in preds {
                let length = longest.get(&pred).copied().unwrap_or(0.0);
                match chosen {
                    Some((_, best)) if length <= best => {}
                    _ => chosen = Some((pred, length)),
                }
            }

            let base = match chosen {
                Some((pred, length)) => {
                    best_pred.insert(node_ix, pred);
                    length
                }
                None => 0.0,
            };
            longest.insert(node_ix, base + self.dag.node(node_ix).points);
        }

        let mut end: Option<(NodeIndex, f64)> = None;
        for node_ix in self.dag.graph.node_indices() {
            let length = longest.get(&node_ix).copied().unwrap_or(0.0);
            match end {
                Some((_, best)) if length <= best => {}
                _ => end = Some((node_ix, length)),
            }
        }

        let Some((end_ix, points)) = end else {
            return Ok(CriticalPath::default());
        };

        let mut path = vec![end_ix];
        let mut current = end_ix;
        while let Some(&pred) = best_pred.get(&current) {
            path.push(pred);
            current = pred;
        }
        path.reverse();

        Ok(CriticalPath {
            points,
            keys: path
                .into_iter()
                .map(|ix| self.dag.key(ix).to_string())
                .collect(),
        })
    }
}
