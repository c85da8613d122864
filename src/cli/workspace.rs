//! Workspace queries.
//!
//! # Examples
//!
//! ```bash
//! devops workspace list
//! devops workspace dependents www
//! devops workspace dependents utils --reverse
//! devops workspace dependents www --direct
//! devops workspace images www --format json
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use super::common::{OutputFormat, Session, print_names};
use crate::resolver::Monorepo;

/// Query discovered workspaces.
#[derive(Args, Debug)]
pub struct WorkspaceCommand {
    #[command(subcommand)]
    command: WorkspaceSubcommands,
}

#[derive(Subcommand, Debug)]
enum WorkspaceSubcommands {
    /// List every discovered workspace.
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// The workspace followed by every workspace it transitively depends on.
    Dependents {
        /// Workspace name
        name: String,

        /// List the workspaces that depend on NAME instead
        #[arg(long)]
        reverse: bool,

        /// Only the workspaces NAME depends on directly
        #[arg(long, conflicts_with = "reverse")]
        direct: bool,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Images whose build context contains the workspace.
    Images {
        /// Workspace name
        name: String,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

impl WorkspaceCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        match self.command {
            WorkspaceSubcommands::List { format } => {
                let monorepo = Monorepo::discover(root)?;
                let names: Vec<String> = monorepo.index().names().map(str::to_string).collect();
                print_names(&names, format)
            }
            WorkspaceSubcommands::Dependents {
                name,
                reverse,
                direct,
                format,
            } => {
                let monorepo = Monorepo::discover(root)?;
                let names = if reverse {
                    monorepo.required_by(&name)?
                } else if direct {
                    monorepo.direct_dependencies(&name)?
                } else {
                    monorepo.dependents_of(&name)?
                };
                print_names(&names, format)
            }
            WorkspaceSubcommands::Images { name, format } => {
                let session = Session::load(root)?;
                print_names(&session.resolver.images_containing(&name)?, format)
            }
        }
    }
}
