use super::GraphError;
use super::cycles::{CycleRepair, repair_cycles};
use super::dependency_dag::DependencyGraph;
use crate::work_item::WorkItem;
use std::collections::BTreeMap;
use tracing::debug;

/// A repaired, acyclic dependency graph plus the diagnostics of the repair.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub dag: DependencyGraph,
    pub repair: CycleRepair,
}

pub struct GraphBuilder<'a> {
    items: &'a BTreeMap<String, WorkItem>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(items: &'a BTreeMap<String, WorkItem>) -> Self {
        Self { items }
    }

    pub fn build(&self) -> Result<BuiltGraph, GraphError> {
        // Step 1: Nodes for remaining work, edges between them
        let mut dag = DependencyGraph::from_items(self.items);
        debug!(
            nodes = dag.node_count(),
            edges = dag.edge_count(),
            "built dependency graph"
        );

        // Step 2: Break cycles; the result is validated acyclic
        let repair = repair_cycles(&mut dag)?;

        Ok(BuiltGraph { dag, repair })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_item_validation::normalize_items;

    #[test]
    fn three_node_cycle_loses_exactly_one_edge() {
        let items = normalize_items(vec![
            WorkItem::new("A", 1.0).blocking(&["B"]),
            WorkItem::new("B", 1.0).blocking(&["C"]),
            WorkItem::new("C", 1.0).blocking(&["A"]),
        ]);
        let built = GraphBuilder::new(&items.items).build().unwrap();

        assert_eq!(built.repair.cycles, vec![vec!["A", "B", "C"]]);
        assert_eq!(built.repair.removed_edges.len(), 1);
        assert_eq!(built.repair.removed_edges[0].from, "A");
        assert_eq!(built.repair.removed_edges[0].to, "B");
        assert_eq!(built.dag.edge_count(), 2);
        assert!(built.dag.is_acyclic());
    }

    #[test]
    fn acyclic_input_is_untouched() {
        let items = normalize_items(vec![
            WorkItem::new("A", 1.0).blocking(&["B", "C"]),
            WorkItem::new("B", 1.0).blocking(&["C"]),
            WorkItem::new("C", 1.0),
        ]);
        let built = GraphBuilder::new(&items.items).build().unwrap();
        assert!(built.repair.cycles.is_empty());
        assert_eq!(built.dag.edge_count(), 3);
    }
}
