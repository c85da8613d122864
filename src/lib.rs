//! devops - monorepo workspace graph and Kubernetes manifest generation
//!
//! Discovers the internal workspaces of a monorepo, works out which of them
//! belong in each deployable container image and generates the Kubernetes
//! manifests of those images from reusable templates with per-workspace
//! overrides. The output is plain YAML for an external apply/delete step;
//! nothing here talks to a cluster.
//!
//! # Architecture Overview
//!
//! ```text
//! package.json / pyproject.toml      .devops/config/*.yaml
//!            │                                 │
//!        discovery ──► resolver ◄──────────  config
//!                         │                    │
//!                         ▼                    ▼
//!                       k8s (contexts) ──► templating (compose, override)
//!                         │
//!                         ▼
//!                 `---`-joined YAML
//! ```
//!
//! # Core Modules
//!
//! - [`discovery`] - Node and Python workspace discovery into [`discovery::PackageRecord`]s
//! - [`resolver`] - Per-language dependency graphs and image build contexts
//! - [`config`] - `.devops/config` loading (project constants, images)
//! - [`templating`] - Fragment composition, rendering and override merging
//! - [`k8s`] - Template contexts, generation entry points and final checks
//! - [`core`] - Error taxonomy and file helpers
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use devops_cli::config::DevopsConfig;
//! use devops_cli::k8s::{ManifestGenerator, NoScale};
//! use devops_cli::resolver::{ImageResolver, Monorepo};
//! use devops_cli::templating::TemplateComposer;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = Path::new(".");
//! let config = DevopsConfig::load(root)?;
//! let monorepo = Monorepo::discover(root)?;
//! let resolver = ImageResolver::build(&monorepo, &config)?;
//! let composer = TemplateComposer::load(&config.manifests_dir())?;
//!
//! let generator = ManifestGenerator::new(&config, &composer, &resolver, &NoScale);
//! println!("{}", generator.image_deployments("staging", "main", "4f2a9c1")?);
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// Workspaces
pub mod discovery;
pub mod resolver;

// Manifest generation
pub mod k8s;
pub mod templating;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
