//! Manifest generation commands.
//!
//! The generated YAML goes to stdout, ready to be piped into the apply
//! tooling:
//!
//! ```bash
//! devops generate image main --env staging --sha "$GIT_SHA" | kubectl apply -f -
//! devops generate workspace www --env production --sha "$GIT_SHA"
//! devops generate db-migrate main --env staging --sha "$GIT_SHA"
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use super::common::{Session, TargetArgs};
use crate::core::DevopsError;
use crate::k8s::ManifestGenerator;
use crate::templating::TemplateComposer;

/// Generate Kubernetes manifests.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    #[command(subcommand)]
    command: GenerateSubcommands,
}

#[derive(Subcommand, Debug)]
enum GenerateSubcommands {
    /// Debug pod and every deployable workspace of an image.
    Image {
        /// Image name
        image: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Deployment of one workspace, overrides included.
    Workspace {
        /// Workspace name
        name: String,

        /// Image to deploy from (default: first image containing the workspace)
        #[arg(long)]
        image: Option<String>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Debug pod of an image.
    Debug {
        /// Image name
        image: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Database migration job of an image.
    DbMigrate {
        /// Image name
        image: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}

impl GenerateCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        let session = Session::load(root)?;
        let composer = TemplateComposer::load(&session.config.manifests_dir())?;

        let manifest = match self.command {
            GenerateSubcommands::Image { image, target } => {
                let scale = target.scale_source()?;
                ManifestGenerator::new(&session.config, &composer, &session.resolver, scale.as_ref())
                    .image_deployments(&target.env, &image, &target.sha)?
            }
            GenerateSubcommands::Workspace {
                name,
                image,
                target,
            } => {
                let workspace = session.monorepo.index().get(&name)?;
                let record = workspace.deployable().ok_or_else(|| DevopsError::DeploymentMissing {
                    workspace: name.clone(),
                })?;
                let image = session.image_for(&name, image.as_deref())?;
                let scale = target.scale_source()?;
                ManifestGenerator::new(&session.config, &composer, &session.resolver, scale.as_ref())
                    .workspace_deployment(record, &target.env, &image, &target.sha)?
            }
            GenerateSubcommands::Debug { image, target } => {
                let scale = target.scale_source()?;
                ManifestGenerator::new(&session.config, &composer, &session.resolver, scale.as_ref())
                    .debug_deployment(&target.env, &image, &target.sha)?
            }
            GenerateSubcommands::DbMigrate { image, target } => {
                let scale = target.scale_source()?;
                ManifestGenerator::new(&session.config, &composer, &session.resolver, scale.as_ref())
                    .db_migrate_job(&target.env, &image, &target.sha)?
            }
        };

        print!("{manifest}");
        Ok(())
    }
}
