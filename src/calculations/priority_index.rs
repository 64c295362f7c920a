use crate::graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::Dfs;
use rayon::prelude::*;
use std::cmp::Reverse;

/// Transitive descendant counts per node and the resulting claim order.
///
/// Built once per graph snapshot and shared read-only by every trial.
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    descendants: Vec<usize>,
    order: Vec<NodeIndex>,
    rank: Vec<usize>,
}

impl PriorityIndex {
    pub fn build(dag: &DependencyGraph) -> Self {
        let nodes: Vec<NodeIndex> = dag.graph.node_indices().collect();

        let descendants: Vec<usize> = nodes
            .par_iter()
            .map(|&start| {
                let mut dfs = Dfs::new(&dag.graph, start);
                let mut reached = 0usize;
                while dfs.next(&dag.graph).is_some() {
                    reached += 1;
                }
                reached - 1
            })
            .collect();

        // Highest descendant count first; ties by ascending key
        let mut order = nodes;
        order.sort_by_key(|&ix| (Reverse(descendants[ix.index()]), dag.key(ix).to_string()));

        let mut rank = vec![0; order.len()];
        for (position, ix) in order.iter().enumerate() {
            rank[ix.index()] = position;
        }

        Self {
            descendants,
            order,
            rank,
        }
    }

    pub fn descendants(&self, ix: NodeIndex) -> usize {
        self.descendants[ix.index()]
    }

    /// Nodes from highest to lowest priority.
    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    /// Position of a node in `order`; lower is claimed first.
    pub fn rank(&self, ix: NodeIndex) -> usize {
        self.rank[ix.index()]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
