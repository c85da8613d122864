//! Command-line interface for devops.
//!
//! Each command lives in its own module with its argument structure and
//! execution logic. Commands only wire the library together and print the
//! result to stdout; diagnostics go to stderr through `tracing`.
//!
//! # Available Commands
//!
//! ## Workspaces and images
//! - `workspace list` - List discovered workspaces
//! - `workspace dependents <name>` - Transitive dependencies of a workspace
//!   (`--reverse` for the workspaces that require it)
//! - `workspace images <name>` - Images whose build context holds a workspace
//! - `image workspaces <image>` - Build context of an image
//!
//! ## Manifests
//! - `generate image <image>` - Debug pod and every deployable workspace
//! - `generate workspace <name>` - One workspace, overrides included
//! - `generate debug <image>` - Debug pod
//! - `generate db-migrate <image>` - Database migration job
//! - `template context deployment|debug|db-migrate` - Print a render context
//!
//! # Global Options
//!
//! - `--root` - Monorepo root (`MONOREPO_ROOT`, default current directory)
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//!
//! # Examples
//!
//! ```bash
//! devops workspace dependents www
//! devops --root ~/src/acme image workspaces main --format json
//! devops generate image main --env staging --sha "$(git rev-parse HEAD)"
//! devops generate workspace www --env production --sha abc123 --scale-file scale.json
//! ```

mod common;
mod generate;
mod image;
mod template;
mod workspace;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::MONOREPO_ROOT_ENV;

pub use common::OutputFormat;

/// Main CLI application structure for devops.
#[derive(Parser, Debug)]
#[command(
    name = "devops",
    about = "Monorepo devops - workspace dependency graph and Kubernetes manifests",
    version,
    long_about = "Discovers the Node and Python workspaces of a monorepo, resolves which of them belong to each container image and generates the Kubernetes manifests of those images."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Monorepo root directory.
    #[arg(long, global = true, env = MONOREPO_ROOT_ENV, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output for debugging.
    ///
    /// Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all diagnostics except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query discovered workspaces.
    Workspace(workspace::WorkspaceCommand),

    /// Query image build contexts.
    Image(image::ImageCommand),

    /// Generate Kubernetes manifests.
    Generate(generate::GenerateCommand),

    /// Inspect template contexts.
    Template(template::TemplateCommand),
}

impl Cli {
    /// Log filter directive for the selected verbosity.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Execute the selected command.
    pub fn execute(self) -> Result<()> {
        tracing::debug!("Using monorepo root {}", self.root.display());
        match self.command {
            Commands::Workspace(cmd) => cmd.execute(&self.root),
            Commands::Image(cmd) => cmd.execute(&self.root),
            Commands::Generate(cmd) => cmd.execute(&self.root),
            Commands::Template(cmd) => cmd.execute(&self.root),
        }
    }
}
