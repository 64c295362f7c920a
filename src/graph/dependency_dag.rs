use crate::work_item::WorkItem;
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub key: String,
    pub points: f64,
    pub group: Option<String>,
}

/// Blocker -> blocked graph over the remaining (non-completed) work items.
/// Edge weight is the blocker's points. Nodes are inserted in key order, so
/// node indices follow ascending key.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub graph: DiGraph<GraphNode, f64>,
    pub key_to_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn from_items(items: &BTreeMap<String, WorkItem>) -> Self {
        let mut graph: DiGraph<GraphNode, f64> = DiGraph::new();
        let mut key_to_index: HashMap<String, NodeIndex> = HashMap::new();

        // Add nodes first
        for (key, item) in items.iter().filter(|(_, item)| !item.is_complete) {
            let node_ix = graph.add_node(GraphNode {
                key: key.clone(),
                points: item.points,
                group: item.group.clone(),
            });
            key_to_index.insert(key.clone(), node_ix);
        }

        // Add edges: blocker -> blocked
        for (key, item) in items.iter().filter(|(_, item)| !item.is_complete) {
            for blocked in &item.blocks {
                if let (Some(&u), Some(&v)) = (key_to_index.get(key), key_to_index.get(blocked)) {
                    if graph.find_edge(u, v).is_none() {
                        graph.add_edge(u, v, item.points);
                    }
                }
            }
        }

        Self {
            graph,
            key_to_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    pub fn index_of(&self, key: &str) -> Option<NodeIndex> {
        self.key_to_index.get(key).copied()
    }

    pub fn node(&self, ix: NodeIndex) -> &GraphNode {
        &self.graph[ix]
    }

    pub fn key(&self, ix: NodeIndex) -> &str {
        &self.graph[ix].key
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(u), Some(v)) => self.graph.find_edge(u, v).is_some(),
            _ => false,
        }
    }

    /// Removes the edge `from -> to` if present. Returns whether it existed.
    pub fn remove_edge(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    pub fn predecessors(&self, ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(ix, Direction::Incoming)
    }

    pub fn successors(&self, ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(ix, Direction::Outgoing)
    }

    /// Induced subgraph over the nodes of one group, keeping only edges whose
    /// endpoints are both members.
    pub fn group_subgraph(&self, group: &str) -> DependencyGraph {
        let mut graph: DiGraph<GraphNode, f64> = DiGraph::new();
        let mut key_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for ix in self.graph.node_indices() {
            let node = &self.graph[ix];
            if node.group.as_deref() == Some(group) {
                let new_ix = graph.add_node(node.clone());
                key_to_index.insert(node.key.clone(), new_ix);
                mapping.insert(ix, new_ix);
            }
        }
        for edge in self.graph.edge_indices() {
            if let Some((u, v)) = self.graph.edge_endpoints(edge) {
                if let (Some(&nu), Some(&nv)) = (mapping.get(&u), mapping.get(&v)) {
                    graph.add_edge(nu, nv, self.graph[edge]);
                }
            }
        }

        DependencyGraph {
            graph,
            key_to_index,
        }
    }
}
