//! Image queries.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use super::common::{OutputFormat, Session, print_names};
use crate::config::ImageCatalog;

/// Query image build contexts.
#[derive(Args, Debug)]
pub struct ImageCommand {
    #[command(subcommand)]
    command: ImageSubcommands,
}

#[derive(Subcommand, Debug)]
enum ImageSubcommands {
    /// List the images defined in `images.yaml`.
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Workspaces in the build context of an image.
    Workspaces {
        /// Image name
        image: String,

        /// Only list workspaces that declare a deployment
        #[arg(long)]
        deployable: bool,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

impl ImageCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        let session = Session::load(root)?;
        match self.command {
            ImageSubcommands::List { format } => {
                let names: Vec<String> =
                    session.config.image_names().into_iter().map(str::to_string).collect();
                print_names(&names, format)
            }
            ImageSubcommands::Workspaces {
                image,
                deployable,
                format,
            } => {
                let names: Vec<String> = session
                    .resolver
                    .descendants_of(&image)?
                    .into_iter()
                    .filter(|record| !deployable || record.deployment.is_some())
                    .map(|record| record.name.clone())
                    .collect();
                print_names(&names, format)
            }
        }
    }
}
