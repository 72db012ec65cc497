//! Whole-graph analyses backed by petgraph.
//!
//! The incremental pre-check in [`DependencyGraph::will_make_dependency_cycle`]
//! assumes an acyclic graph. Graphs restored from a snapshot are not checked
//! on load, so these analyses are the way to find existing cycles and to
//! compute a load order.

use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::dependency_graph::DependencyGraph;
use super::error::GraphError;

/// Information about a detected circular dependency.
///
/// `nodes` holds the members of one strongly connected component, ordered
/// by walking dependency edges from the smallest id. For a simple ring this
/// is the exact cycle path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The node ids in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    /// Returns the number of nodes in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl DependencyGraph {
    /// Builds a petgraph view of the registered nodes, with edges pointing
    /// from dependent to dependency. Edges to unregistered ids are skipped.
    fn to_petgraph(&self) -> DiGraph<&str, ()> {
        let mut ids: Vec<&str> = self.node_ids().collect();
        ids.sort_unstable();

        let mut graph = DiGraph::with_capacity(ids.len(), self.edge_count());
        let indices: HashMap<&str, NodeIndex> =
            ids.iter().map(|&id| (id, graph.add_node(id))).collect();

        for &id in &ids {
            let Some(deps) = self.get_dependencies(id) else {
                continue;
            };
            let mut deps: Vec<&str> = deps.iter().map(String::as_str).collect();
            deps.sort_unstable();

            for dep in deps {
                if let Some(&to) = indices.get(dep) {
                    graph.add_edge(indices[id], to, ());
                }
            }
        }

        graph
    }

    /// Checks if the graph contains cycles.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::with_cycles_allowed(true);
    /// graph.add_node("a");
    /// graph.add_node_with_dependencies("b", ["a"]);
    /// assert!(!graph.has_cycles());
    ///
    /// graph.add_dependency("a", "b");
    /// assert!(graph.has_cycles());
    /// ```
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.to_petgraph())
    }

    /// Detects and returns all cycles in the graph, self-loops included.
    ///
    /// Cycles are sorted by their first node id.
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let graph = self.to_petgraph();
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&graph) {
            if scc.len() > 1 {
                let members: HashSet<&str> = scc.iter().map(|&idx| graph[idx]).collect();
                cycles.push(CycleInfo {
                    nodes: self.walk_component(&members),
                });
            } else if let Some(&idx) = scc.first() {
                if graph.contains_edge(idx, idx) {
                    cycles.push(CycleInfo {
                        nodes: vec![graph[idx].to_string()],
                    });
                }
            }
        }

        cycles.sort_by(|a, b| a.nodes.first().cmp(&b.nodes.first()));
        cycles
    }

    /// Returns the ids of all nodes that take part in a cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<String> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }

    /// Returns every registered node ordered so that each node comes after
    /// all of its dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CyclicDependency`] naming a node on a cycle if
    /// no such order exists.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("core");
    /// graph.add_node_with_dependencies("app", ["core", "ui"]);
    /// graph.add_node_with_dependencies("ui", ["core"]);
    /// graph.add_dependency("app", "ui");
    ///
    /// assert_eq!(graph.load_order().unwrap(), vec!["core", "ui", "app"]);
    /// ```
    pub fn load_order(&self) -> Result<Vec<String>, GraphError> {
        let graph = self.to_petgraph();

        let sorted = toposort(&graph, None)
            .map_err(|cycle| GraphError::CyclicDependency(graph[cycle.node_id()].to_string()))?;

        // toposort puts dependents first; dependencies must load first.
        Ok(sorted
            .into_iter()
            .rev()
            .map(|idx| graph[idx].to_string())
            .collect())
    }

    /// Orders the members of a strongly connected component by following
    /// dependency edges from the smallest id.
    fn walk_component(&self, members: &HashSet<&str>) -> Vec<String> {
        let mut remaining: Vec<&str> = members.iter().copied().collect();
        remaining.sort_unstable();

        let mut ordered: Vec<&str> = Vec::with_capacity(remaining.len());
        let mut visited: HashSet<&str> = HashSet::with_capacity(remaining.len());
        let mut current = remaining.first().copied();

        while let Some(id) = current {
            ordered.push(id);
            visited.insert(id);

            current = self.get_dependencies(id).and_then(|deps| {
                deps.iter()
                    .map(String::as_str)
                    .filter(|dep| members.contains(dep) && !visited.contains(dep))
                    .min()
            });
        }

        for id in remaining {
            if !visited.contains(id) {
                ordered.push(id);
            }
        }

        ordered.into_iter().map(str::to_string).collect()
    }
}
