//! Workspace dependency graph.
//!
//! Nodes are the workspaces of one language; an edge `a -> b` means `a`
//! lists `b` among its dependencies. The graph is built once from the
//! discovered records and never mutated afterwards. Cycles are tolerated:
//! every walk keeps a visited set, so each workspace is reported once.

use anyhow::Result;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{DevopsError, similar_names};
use crate::discovery::{Language, PackageRecord};

/// Directed "depends on" graph over the workspaces of one language.
#[derive(Debug, Clone)]
pub struct WorkspaceGraph {
    language: Language,
    /// The underlying directed graph.
    graph: DiGraph<String, ()>,
    /// Map from workspace names to their graph indices.
    node_map: HashMap<String, NodeIndex>,
}

impl WorkspaceGraph {
    /// Build the graph from every record of `language`.
    ///
    /// Records of other languages are ignored, as are dependency names with
    /// no record of their own.
    pub fn build(language: Language, records: &[PackageRecord]) -> Self {
        let mut graph = Self {
            language,
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };

        let records: Vec<&PackageRecord> =
            records.iter().filter(|record| record.language == language).collect();
        for record in &records {
            graph.ensure_node(&record.name);
        }

        for record in &records {
            let from = graph.node_map[&record.name];
            for dependency in &record.dependency_names {
                let Some(&to) = graph.node_map.get(dependency) else {
                    continue;
                };
                // Edge indices keep declaration order.
                if !graph.graph.contains_edge(from, to) {
                    graph.graph.add_edge(from, to, ());
                }
            }
        }

        tracing::debug!(
            "Built {} dependency graph with {} workspaces and {} edges",
            language,
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    fn index_of(&self, name: &str) -> Result<NodeIndex> {
        self.node_map.get(name).copied().ok_or_else(|| {
            DevopsError::WorkspaceNotFound {
                name: name.to_string(),
                suggestions: similar_names(name, self.names()),
            }
            .into()
        })
    }

    /// Neighbors in `direction`, ordered by edge insertion.
    fn neighbors_in_order(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self.graph.edges_directed(node, direction).collect();
        edges.sort_by_key(|edge| edge.id().index());
        edges
            .into_iter()
            .map(|edge| if edge.source() == node { edge.target() } else { edge.source() })
            .collect()
    }

    /// `name` followed by every workspace it transitively depends on.
    ///
    /// Depth-first and pre-order: each workspace appears before the
    /// expansion of its own dependencies, dependencies are expanded in
    /// declaration order, and a workspace already emitted on another branch
    /// is not repeated.
    ///
    /// With `a -> [b, d]` and `b -> [c]`, `dependents_of("a")` is
    /// `[a, b, c, d]` and `dependents_of("c")` is `[c]`.
    pub fn dependents_of(&self, name: &str) -> Result<Vec<String>> {
        let start = self.index_of(name)?;
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.visit(start, &mut visited, &mut order);
        Ok(order)
    }

    fn visit(&self, node: NodeIndex, visited: &mut HashSet<NodeIndex>, order: &mut Vec<String>) {
        if !visited.insert(node) {
            return;
        }
        order.push(self.graph[node].clone());
        for dependency in self.neighbors_in_order(node, Direction::Outgoing) {
            self.visit(dependency, visited, order);
        }
    }

    /// Every workspace that directly or transitively depends on `name`.
    ///
    /// Breadth-first, nearest first; `name` itself is never included, even
    /// when it sits on a cycle.
    pub fn required_by(&self, name: &str) -> Result<Vec<String>> {
        let start = self.index_of(name)?;
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            for dependent in self.neighbors_in_order(current, Direction::Incoming) {
                if visited.insert(dependent) {
                    order.push(self.graph[dependent].clone());
                    queue.push_back(dependent);
                }
            }
        }

        Ok(order)
    }

    /// Direct dependencies of `name`, in declaration order.
    pub fn direct_dependencies(&self, name: &str) -> Result<Vec<String>> {
        let node = self.index_of(name)?;
        Ok(self
            .neighbors_in_order(node, Direction::Outgoing)
            .into_iter()
            .map(|index| self.graph[index].clone())
            .collect())
    }

    /// Dependency cycles, each as a sorted list of workspace names.
    ///
    /// Self-dependencies count as cycles of one. Reported for diagnostics
    /// only; every walk terminates regardless.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut names: Vec<String> =
                    component.into_iter().map(|index| self.graph[index].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Language of the workspaces in this graph.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Whether `name` is a node of this graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Workspace names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|index| self.graph[index].as_str())
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of workspaces in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of dependency edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
