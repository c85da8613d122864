//! Dependency resolution for the monorepo.
//!
//! [`Monorepo`] owns the discovered [`WorkspaceIndex`] and one
//! [`WorkspaceGraph`] per language. Both are built once and handed around by
//! reference; nothing here caches behind the caller's back.
//!
//! # Modules
//!
//! - `dependency_graph` - [`WorkspaceGraph`], the per-language depends-on graph
//! - `images` - [`ImageResolver`], image build contexts and their inverse

pub mod dependency_graph;
pub mod images;

pub use dependency_graph::WorkspaceGraph;
pub use images::ImageResolver;

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::discovery::{Language, WorkspaceIndex};

/// Discovered workspaces of a monorepo with their dependency graphs.
#[derive(Debug, Clone)]
pub struct Monorepo {
    root: PathBuf,
    index: WorkspaceIndex,
    node_graph: WorkspaceGraph,
    python_graph: WorkspaceGraph,
}

impl Monorepo {
    /// Discover the workspaces below `root` and build their graphs.
    pub fn discover(root: &Path) -> Result<Self> {
        let index = WorkspaceIndex::discover(root)?;
        let monorepo = Self::from_index(root, index);
        tracing::info!(
            "Discovered {} workspaces ({} node, {} python) in {}",
            monorepo.index.len(),
            monorepo.node_graph.node_count(),
            monorepo.python_graph.node_count(),
            root.display()
        );
        for language in Language::ALL {
            for cycle in monorepo.graph(language).cycles() {
                tracing::warn!("Dependency cycle between {} workspaces: {}", language, cycle.join(", "));
            }
        }
        Ok(monorepo)
    }

    /// Build the graphs of an already populated index.
    pub fn from_index(root: &Path, index: WorkspaceIndex) -> Self {
        let node_graph = WorkspaceGraph::build(Language::Node, index.records(Language::Node));
        let python_graph = WorkspaceGraph::build(Language::Python, index.records(Language::Python));
        Self {
            root: root.to_path_buf(),
            index,
            node_graph,
            python_graph,
        }
    }

    /// Monorepo root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All discovered workspaces.
    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    /// The dependency graph of `language`.
    pub fn graph(&self, language: Language) -> &WorkspaceGraph {
        match language {
            Language::Node => &self.node_graph,
            Language::Python => &self.python_graph,
        }
    }

    /// `name` followed by every workspace it transitively depends on.
    ///
    /// A workspace declared for several languages is walked in each of its
    /// graphs; the results are concatenated without repeats.
    pub fn dependents_of(&self, name: &str) -> Result<Vec<String>> {
        let workspace = self.index.get(name)?;
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for record in &workspace.packages {
            for dependent in self.graph(record.language).dependents_of(name)? {
                if seen.insert(dependent.clone()) {
                    order.push(dependent);
                }
            }
        }
        Ok(order)
    }

    /// Workspaces `name` declares as dependencies, in declaration order.
    pub fn direct_dependencies(&self, name: &str) -> Result<Vec<String>> {
        let workspace = self.index.get(name)?;
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for record in &workspace.packages {
            for dependency in self.graph(record.language).direct_dependencies(name)? {
                if seen.insert(dependency.clone()) {
                    order.push(dependency);
                }
            }
        }
        Ok(order)
    }

    /// Every workspace that directly or transitively depends on `name`.
    pub fn required_by(&self, name: &str) -> Result<Vec<String>> {
        let workspace = self.index.get(name)?;
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for record in &workspace.packages {
            for dependent in self.graph(record.language).required_by(name)? {
                if seen.insert(dependent.clone()) {
                    order.push(dependent);
                }
            }
        }
        Ok(order)
    }
}
