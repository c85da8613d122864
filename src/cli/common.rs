//! Shared helpers for CLI commands.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::DevopsConfig;
use crate::core::DevopsError;
use crate::k8s::{ConfigMapScale, NoScale, ScaleSource};
use crate::resolver::{ImageResolver, Monorepo};

/// Output format of list commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One name per line
    #[default]
    Text,
    /// JSON array
    Json,
}

impl OutputFormat {
    /// Render a list of names.
    pub fn render(self, names: &[String]) -> Result<String> {
        match self {
            Self::Text => Ok(names.join("\n")),
            Self::Json => serde_json::to_string_pretty(names).context("Failed to serialize names"),
        }
    }
}

/// Print a list of names to stdout.
pub fn print_names(names: &[String], format: OutputFormat) -> Result<()> {
    let rendered = format.render(names)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

/// Environment, revision and scale of a generation run.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Target environment (e.g. staging, production)
    #[arg(long, env = "MONOREPO_ENV")]
    pub env: String,

    /// Git revision the image was built from
    #[arg(long, env = "GIT_SHA")]
    pub sha: String,

    /// JSON file holding the `data` of the image config map
    ///
    /// Persisted replica counts are read from its `scale` key.
    #[arg(long)]
    pub scale_file: Option<PathBuf>,
}

impl TargetArgs {
    /// Scale source selected by `--scale-file`.
    pub fn scale_source(&self) -> Result<Box<dyn ScaleSource>> {
        match &self.scale_file {
            Some(path) => {
                let scale = ConfigMapScale::from_file(path)?;
                if let Some(version) = scale.version() {
                    tracing::info!("Using scale recorded for version {}", version);
                }
                Ok(Box::new(scale))
            }
            None => Ok(Box::new(NoScale)),
        }
    }
}

/// Monorepo, configuration and image resolution loaded for one command.
pub struct Session {
    pub config: DevopsConfig,
    pub monorepo: Monorepo,
    pub resolver: ImageResolver,
}

impl Session {
    /// Discover workspaces and load the `.devops` configuration below `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config = DevopsConfig::load(root)?;
        let monorepo = Monorepo::discover(root)?;
        let resolver = ImageResolver::build(&monorepo, &config)?;
        Ok(Self {
            config,
            monorepo,
            resolver,
        })
    }

    /// `image` when given, otherwise the first image containing `workspace`.
    pub fn image_for(&self, workspace: &str, image: Option<&str>) -> Result<String> {
        if let Some(image) = image {
            return Ok(image.to_string());
        }
        let images = self.resolver.images_containing(workspace)?;
        images.into_iter().next().ok_or_else(|| {
            DevopsError::ConfigError {
                message: format!("Workspace {workspace} is not part of any image; pass --image"),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_names() {
        let names = vec!["www".to_string(), "api".to_string()];
        assert_eq!(OutputFormat::Text.render(&names).unwrap(), "www\napi");
        assert_eq!(OutputFormat::Json.render(&names).unwrap(), "[\n  \"www\",\n  \"api\"\n]");
        assert_eq!(OutputFormat::Text.render(&[]).unwrap(), "");
    }
}
