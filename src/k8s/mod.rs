//! Kubernetes manifest generation.
//!
//! [`ManifestGenerator`] is the entry point. Each call builds the contexts of
//! one image in one environment, renders the matching templates, merges
//! workspace overrides where they apply and returns a single `---`-joined
//! YAML string.
//!
//! | Call                     | Template                     | Overrides |
//! |--------------------------|------------------------------|-----------|
//! | `image_deployments`      | debug template + each app's  | apps only |
//! | `workspace_deployment`   | the workspace's `template`   | yes       |
//! | `debug_deployment`       | the image's `debug-template` | no        |
//! | `db_migrate_job`         | `db-migrate`                 | no        |
//!
//! Every output passes through [`validate::ensure_complete`] before it is
//! returned.
//!
//! # Modules
//!
//! - `context` - the three template context shapes and their generator
//! - `naming` - cluster-side names derived from the project constants
//! - `scale` - persisted replica counts
//! - `validate` - final manifest checks

pub mod context;
pub mod naming;
pub mod scale;
pub mod validate;

pub use context::{
    DbMigrateContext, DebugContext, DeploymentContext, ImageContextGenerator, SharedContext,
    to_tera,
};
pub use scale::{ConfigMapScale, NoScale, ScaleSource};
pub use validate::ensure_complete;

use anyhow::{Context, Result};

use crate::config::DevopsConfig;
use crate::constants::DB_MIGRATE_TEMPLATE;
use crate::core::DevopsError;
use crate::discovery::PackageRecord;
use crate::resolver::ImageResolver;
use crate::templating::{ManifestDocument, TemplateComposer, apply_overrides, join_documents};

/// Generates the manifests of images and their workspaces.
pub struct ManifestGenerator<'a> {
    config: &'a DevopsConfig,
    composer: &'a TemplateComposer,
    resolver: &'a ImageResolver,
    scale: &'a dyn ScaleSource,
}

impl<'a> ManifestGenerator<'a> {
    pub fn new(
        config: &'a DevopsConfig,
        composer: &'a TemplateComposer,
        resolver: &'a ImageResolver,
        scale: &'a dyn ScaleSource,
    ) -> Self {
        Self {
            config,
            composer,
            resolver,
            scale,
        }
    }

    fn contexts(&self, env: &str, image: &str, git_sha: &str) -> Result<ImageContextGenerator<'a>> {
        ImageContextGenerator::new(self.config, self.scale, env, image, git_sha)
    }

    /// Debug pod followed by every deployable workspace of `image`.
    pub fn image_deployments(&self, env: &str, image: &str, git_sha: &str) -> Result<String> {
        let contexts = self.contexts(env, image, git_sha)?;

        let mut documents = self.render_debug(&contexts)?;

        let mut deployed = 0;
        for record in self.resolver.descendants_of(image)? {
            if record.deployment.is_none() {
                continue;
            }
            documents.extend(self.render_deployment(&contexts, record)?);
            deployed += 1;
        }

        tracing::info!("Generated {} workspace deployments for image {} in {}", deployed, image, env);
        ensure_complete(join_documents(&documents)?, env, image)
    }

    /// Deployment of a single workspace, overrides included.
    pub fn workspace_deployment(
        &self,
        record: &PackageRecord,
        env: &str,
        image: &str,
        git_sha: &str,
    ) -> Result<String> {
        let contexts = self.contexts(env, image, git_sha)?;
        let documents = self.render_deployment(&contexts, record)?;
        ensure_complete(join_documents(&documents)?, env, image)
    }

    /// Debug pod of `image`.
    pub fn debug_deployment(&self, env: &str, image: &str, git_sha: &str) -> Result<String> {
        let contexts = self.contexts(env, image, git_sha)?;
        let documents = self.render_debug(&contexts)?;
        ensure_complete(join_documents(&documents)?, env, image)
    }

    /// Database migration job of `image` at `git_sha`.
    pub fn db_migrate_job(&self, env: &str, image: &str, git_sha: &str) -> Result<String> {
        let contexts = self.contexts(env, image, git_sha)?;
        let context = to_tera(&contexts.db_migrate())?;
        let documents = self.composer.render_template(DB_MIGRATE_TEMPLATE, &context)?;
        ensure_complete(join_documents(&documents)?, env, image)
    }

    fn render_debug(&self, contexts: &ImageContextGenerator<'_>) -> Result<Vec<ManifestDocument>> {
        let template = contexts.image().debug_template.as_deref().ok_or_else(|| {
            DevopsError::ConfigError {
                message: format!("Image {} does not declare a debug-template", contexts.image_name()),
            }
        })?;
        let context = to_tera(&contexts.debug())?;
        self.composer
            .render_template(template, &context)
            .with_context(|| format!("Rendering debug pod of image {}", contexts.image_name()))
    }

    fn render_deployment(
        &self,
        contexts: &ImageContextGenerator<'_>,
        record: &PackageRecord,
    ) -> Result<Vec<ManifestDocument>> {
        let deployment = contexts.deployment(record)?;
        let context = to_tera(&deployment)?;

        let base = self
            .composer
            .render_template(&deployment.template, &context)
            .with_context(|| format!("Rendering deployment of workspace {}", record.name))?;
        apply_overrides(&record.root_path, base, &context)
            .with_context(|| format!("Applying overrides of workspace {}", record.name))
    }
}
