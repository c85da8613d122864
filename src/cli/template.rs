//! Template design helpers.
//!
//! Prints the context a template of each kind is rendered with, so template
//! authors can see which variables exist:
//!
//! ```bash
//! devops template list
//! devops template context deployment www --env staging --sha abc123
//! devops template context debug main --env staging --sha abc123
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use super::common::{OutputFormat, Session, TargetArgs, print_names};
use crate::core::DevopsError;
use crate::k8s::ImageContextGenerator;
use crate::templating::TemplateComposer;

/// Inspect template contexts.
#[derive(Args, Debug)]
pub struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommands,
}

#[derive(Subcommand, Debug)]
enum TemplateSubcommands {
    /// List the templates of the fragment index.
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Print the context a template kind is rendered with, as JSON.
    Context {
        /// Kind of template
        #[arg(value_enum)]
        kind: ContextKind,

        /// Workspace for `deployment`, image for `debug` and `db-migrate`
        name: String,

        /// Image to deploy from (deployment only; default: first image
        /// containing the workspace)
        #[arg(long)]
        image: Option<String>,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ContextKind {
    Deployment,
    Debug,
    DbMigrate,
}

impl TemplateCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        match self.command {
            TemplateSubcommands::List { format } => {
                let session = Session::load(root)?;
                let composer = TemplateComposer::load(&session.config.manifests_dir())?;
                let names: Vec<String> = composer.template_names().map(str::to_string).collect();
                print_names(&names, format)
            }
            TemplateSubcommands::Context {
                kind,
                name,
                image,
                target,
            } => {
                let session = Session::load(root)?;
                let image = match kind {
                    ContextKind::Deployment => session.image_for(&name, image.as_deref())?,
                    ContextKind::Debug | ContextKind::DbMigrate => name.clone(),
                };
                let scale = target.scale_source()?;
                let contexts = ImageContextGenerator::new(
                    &session.config,
                    scale.as_ref(),
                    &target.env,
                    &image,
                    &target.sha,
                )?;

                eprintln!(
                    "{}",
                    format!("Context of a {kind:?} template for image {image} in {}:", target.env)
                        .green()
                );
                match kind {
                    ContextKind::Deployment => {
                        let workspace = session.monorepo.index().get(&name)?;
                        let record = workspace.deployable().ok_or_else(|| {
                            DevopsError::DeploymentMissing {
                                workspace: name.clone(),
                            }
                        })?;
                        print_json(&contexts.deployment(record)?)
                    }
                    ContextKind::Debug => print_json(&contexts.debug()),
                    ContextKind::DbMigrate => print_json(&contexts.db_migrate()),
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize context")?;
    println!("{json}");
    Ok(())
}
