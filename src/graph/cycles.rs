use super::GraphError;
use super::dependency_dag::DependencyGraph;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemovedEdge {
    pub from: String,
    pub to: String,
}

/// Outcome of cycle repair: every simple cycle that was found and the edges
/// dropped to break them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleRepair {
    pub cycles: Vec<Vec<String>>,
    pub removed_edges: Vec<RemovedEdge>,
}

/// Enumerates all elementary cycles (Johnson). Each cycle starts at its
/// lowest node index and lists nodes in traversal order.
pub fn simple_cycles<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut cycles = Vec::new();

    for mut members in tarjan_scc(graph) {
        let self_loop = members.len() == 1 && graph.contains_edge(members[0], members[0]);
        if members.len() < 2 && !self_loop {
            continue;
        }
        members.sort();

        let local: HashMap<NodeIndex, usize> =
            members.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let adjacency: Vec<Vec<usize>> = members
            .iter()
            .map(|&n| {
                let mut succ: Vec<usize> = graph
                    .neighbors_directed(n, Direction::Outgoing)
                    .filter_map(|m| local.get(&m).copied())
                    .collect();
                succ.sort_unstable();
                succ.dedup();
                succ
            })
            .collect();

        for start in 0..members.len() {
            let mut search = CircuitSearch::new(&adjacency, start);
            search.circuit(start);
            cycles.extend(
                search
                    .found
                    .into_iter()
                    .map(|cycle| cycle.into_iter().map(|i| members[i]).collect()),
            );
        }
    }

    cycles
}

struct CircuitSearch<'a> {
    adjacency: &'a [Vec<usize>],
    start: usize,
    blocked: Vec<bool>,
    waiting: Vec<Vec<usize>>,
    stack: Vec<usize>,
    found: Vec<Vec<usize>>,
}

impl<'a> CircuitSearch<'a> {
    fn new(adjacency: &'a [Vec<usize>], start: usize) -> Self {
        Self {
            adjacency,
            start,
            blocked: vec![false; adjacency.len()],
            waiting: vec![Vec::new(); adjacency.len()],
            stack: Vec::new(),
            found: Vec::new(),
        }
    }

    fn circuit(&mut self, v: usize) -> bool {
        let adjacency = self.adjacency;
        let start = self.start;
        let mut closed = false;
        self.stack.push(v);
        self.blocked[v] = true;

        for &w in adjacency[v].iter().filter(|&&w| w >= start) {
            if w == start {
                self.found.push(self.stack.clone());
                closed = true;
            } else if !self.blocked[w] && self.circuit(w) {
                closed = true;
            }
        }

        if closed {
            self.unblock(v);
        } else {
            for &w in adjacency[v].iter().filter(|&&w| w >= start) {
                if !self.waiting[w].contains(&v) {
                    self.waiting[w].push(v);
                }
            }
        }

        self.stack.pop();
        closed
    }

    fn unblock(&mut self, u: usize) {
        self.blocked[u] = false;
        let waiting = std::mem::take(&mut self.waiting[u]);
        for w in waiting {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }
}

/// Breaks every cycle by removing its first edge (from the cycle's lowest-key
/// node to the next node). An edge shared by several cycles is removed once.
/// The graph must be acyclic afterwards.
pub fn repair_cycles(dag: &mut DependencyGraph) -> Result<CycleRepair, GraphError> {
    if dag.is_acyclic() {
        return Ok(CycleRepair::default());
    }

    let cycles = simple_cycles(&dag.graph);
    warn!(count = cycles.len(), "circular dependencies detected");

    let mut to_remove: BTreeSet<(NodeIndex, NodeIndex)> = BTreeSet::new();
    let mut reported = Vec::with_capacity(cycles.len());
    for cycle in &cycles {
        let keys: Vec<String> = cycle.iter().map(|&ix| dag.key(ix).to_string()).collect();
        warn!(cycle = %keys.join(" -> "), "cycle");
        reported.push(keys);
        let from = cycle[0];
        let to = cycle[1 % cycle.len()];
        to_remove.insert((from, to));
    }

    let mut removed_edges = Vec::with_capacity(to_remove.len());
    for (from, to) in to_remove {
        if dag.remove_edge(from, to) {
            let edge = RemovedEdge {
                from: dag.key(from).to_string(),
                to: dag.key(to).to_string(),
            };
            warn!(from = %edge.from, to = %edge.to, "removing dependency edge");
            removed_edges.push(edge);
        }
    }
    removed_edges.sort();

    if !dag.is_acyclic() {
        return Err(GraphError::UnresolvedCycle {
            removed: removed_edges.len(),
        });
    }

    Ok(CycleRepair {
        cycles: reported,
        removed_edges,
    })
}
