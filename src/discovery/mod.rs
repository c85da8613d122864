//! Workspace discovery for the monorepo.
//!
//! Every buildable unit of the monorepo is described by a manifest file in its
//! own directory: `package.json` for Node workspaces, `pyproject.toml` for
//! Python (uv) workspaces. This module turns those files into uniform
//! [`PackageRecord`]s and merges them into a [`WorkspaceIndex`].
//!
//! # Discovery rules
//!
//! - Node workspaces are the `package.json` files matched by the `workspaces`
//!   globs of the root `package.json` (either a list or `{ "packages": [...] }`).
//! - Python workspaces are the `pyproject.toml` files matched by
//!   `tool.uv.workspace.members` of the root `pyproject.toml`. A monorepo
//!   without a root `pyproject.toml` simply has no Python workspaces.
//! - Files below `node_modules/` or `venv/` are ignored.
//! - Only dependencies naming another workspace of the same language are
//!   kept; everything else is third-party and dropped.
//!
//! # Deployment descriptor
//!
//! A workspace becomes deployable by declaring a `deployment` key
//! (`package.json`) or a `[tool.devops.deployment]` table (`pyproject.toml`):
//!
//! ```json
//! {
//!   "name": "@local/www",
//!   "deployment": {
//!     "template": "external-service",
//!     "service_name": "www",
//!     "port": 3000
//!   }
//! }
//! ```

mod node;
mod processor;
mod python;

pub use node::discover_node_workspaces;
pub use processor::{ConvertedPackage, PackageDataProcessor};
pub use python::{discover_python_workspaces, requirement_name};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{DevopsError, similar_names};

/// Supported language ecosystems.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// npm/pnpm/yarn workspaces described by `package.json`
    #[default]
    Node,
    /// uv workspaces described by `pyproject.toml`
    Python,
}

impl Language {
    /// Every supported language, in discovery order.
    pub const ALL: [Language; 2] = [Language::Node, Language::Python];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Node => write!(f, "node"),
            Language::Python => write!(f, "python"),
        }
    }
}

/// A scheduled job declared by a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CronJob {
    /// Job name, used to identify the job in the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Cron schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// Arguments of the invocation, handed to templates as `cron_jobs[].curl`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curl: Vec<String>,
}

/// How a workspace is deployed.
///
/// Known keys are typed; any other key of the descriptor is kept in
/// [`extra`](Self::extra) and handed to templates unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    /// Name of the reusable manifest template
    pub template: String,
    /// Service name; also the default subdomain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Port exposed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Subdomain, overriding `service_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    /// Application name, overriding the workspace name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Cron schedule for single-job workspaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// Scheduled jobs
    #[serde(default, alias = "cronJobs", skip_serializing_if = "Vec::is_empty")]
    pub cron_jobs: Vec<CronJob>,
    /// Any other declared key
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DeploymentDescriptor {
    /// Create a descriptor using `template` and nothing else.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            service_name: None,
            port: None,
            subdomain: None,
            app_name: None,
            cron: None,
            cron_jobs: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// One discovered workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRecord {
    /// Workspace name, unique within its language
    pub name: String,
    /// Directory containing the manifest file
    pub root_path: PathBuf,
    /// Ecosystem of the manifest
    pub language: Language,
    /// Names of the other workspaces this one depends on, in declaration order
    pub dependency_names: Vec<String>,
    /// Deployment descriptor, when the workspace is deployable
    pub deployment: Option<DeploymentDescriptor>,
}

/// A workspace name with every record declaring it.
///
/// The same directory may hold both a `package.json` and a `pyproject.toml`
/// for one workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    /// Workspace name
    pub name: String,
    /// Shared root directory
    pub root_path: PathBuf,
    /// One record per language declaring the workspace
    pub packages: Vec<PackageRecord>,
}

impl Workspace {
    /// The first record that declares a deployment, if any.
    pub fn deployable(&self) -> Option<&PackageRecord> {
        self.packages.iter().find(|record| record.deployment.is_some())
    }
}

/// All discovered workspaces, by name and by language.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceIndex {
    workspaces: BTreeMap<String, Workspace>,
    by_language: BTreeMap<Language, Vec<PackageRecord>>,
}

impl WorkspaceIndex {
    /// Discover every workspace below `root`.
    pub fn discover(root: &Path) -> Result<Self> {
        let mut records = discover_node_workspaces(root)?;
        records.extend(discover_python_workspaces(root)?);
        Self::from_records(records)
    }

    /// Build an index from already loaded records.
    ///
    /// Fails with [`DevopsError::ConflictingRootPaths`] when one name is
    /// declared in two different directories.
    pub fn from_records(records: impl IntoIterator<Item = PackageRecord>) -> Result<Self> {
        let mut index = Self::default();

        for record in records {
            if let Some(existing) = index.workspaces.get(&record.name) {
                if existing.root_path != record.root_path {
                    return Err(DevopsError::ConflictingRootPaths {
                        name: record.name.clone(),
                        first: existing.root_path.clone(),
                        second: record.root_path.clone(),
                    }
                    .into());
                }
            }

            let language_records = index.by_language.entry(record.language).or_default();
            if language_records.iter().any(|known| known.name == record.name) {
                tracing::warn!(
                    "Workspace {} declared twice for {} in {}; keeping the first",
                    record.name,
                    record.language,
                    record.root_path.display()
                );
                continue;
            }
            language_records.push(record.clone());

            index
                .workspaces
                .entry(record.name.clone())
                .or_insert_with(|| Workspace {
                    name: record.name.clone(),
                    root_path: record.root_path.clone(),
                    packages: Vec::new(),
                })
                .packages
                .push(record);
        }

        Ok(index)
    }

    /// Look up a workspace by name.
    pub fn get(&self, name: &str) -> Result<&Workspace> {
        self.workspaces.get(name).ok_or_else(|| {
            DevopsError::WorkspaceNotFound {
                name: name.to_string(),
                suggestions: similar_names(name, self.names()),
            }
            .into()
        })
    }

    /// Whether a workspace with this name exists in any language.
    pub fn contains(&self, name: &str) -> bool {
        self.workspaces.contains_key(name)
    }

    /// Records of one language, in discovery order.
    pub fn records(&self, language: Language) -> &[PackageRecord] {
        self.by_language.get(&language).map(Vec::as_slice).unwrap_or_default()
    }

    /// The record of `name` in `language`.
    pub fn record(&self, language: Language, name: &str) -> Option<&PackageRecord> {
        self.records(language).iter().find(|record| record.name == name)
    }

    /// Every workspace name, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workspaces.keys().map(String::as_str)
    }

    /// Every workspace, sorted by name.
    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.values()
    }

    /// Number of distinct workspace names.
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    /// Whether no workspace was discovered.
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}
