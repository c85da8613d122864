//! Template contexts for one image in one environment.
//!
//! [`ImageContextGenerator`] computes the fields every manifest of an image
//! shares once, then builds one of three context shapes on top of them:
//!
//! - [`DeploymentContext`] for a deployable workspace
//! - [`DbMigrateContext`] for the database migration job
//! - [`DebugContext`] for the debug pod
//!
//! # Deployment context merge order
//!
//! Later steps win:
//!
//! 1. `project_name` (the workspace name) and the shared fields
//! 2. defaults: `app_name` = workspace name, `subdomain` = `service_name`
//! 3. every key of the workspace's deployment descriptor
//! 4. `replicas`: persisted scale, else 1, even when the descriptor declares one

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tera::Context as TeraContext;

use super::naming;
use super::scale::ScaleSource;
use crate::config::{DevopsConfig, ImageCatalog, ImageDescriptor};
use crate::constants::{BASE_SECRET_KEY, DEFAULT_REPLICAS};
use crate::core::DevopsError;
use crate::discovery::{CronJob, PackageRecord};

/// Fields shared by every context of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedContext {
    /// Target environment
    pub monorepo_env: String,
    /// `<project-name>-<env>`
    pub namespace: String,
    /// `<project-name>-secret`
    pub env_secret_name: String,
    /// Key of the base secret inside the env secret
    pub env_base_secret_key: String,
    /// Domain of the image in the environment, or the missing-domain sentinel
    pub domain_name: String,
    /// Fully qualified image reference
    pub image_path: String,
}

/// Context of a deployable workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentContext {
    /// Workspace name
    pub project_name: String,
    #[serde(flatten)]
    pub shared: SharedContext,
    pub app_name: String,
    /// Undeclared optional fields are `null`, which renders as an empty string
    pub subdomain: Option<String>,
    pub template: String,
    pub service_name: Option<String>,
    pub port: Option<u16>,
    pub cron: Option<String>,
    pub cron_jobs: Vec<CronJob>,
    pub replicas: u32,
    /// Undeclared descriptor keys, copied verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Context of the database migration job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbMigrateContext {
    #[serde(flatten)]
    pub shared: SharedContext,
    /// `db-migrate-job-<short sha>`
    pub db_migrate_job_name: String,
}

/// Context of the debug pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugContext {
    #[serde(flatten)]
    pub shared: SharedContext,
    /// `<image>-debug`
    pub debug_pod_name: String,
}

/// Convert a context struct into a Tera context.
pub fn to_tera<T: Serialize>(context: &T) -> Result<TeraContext> {
    TeraContext::from_serialize(context).context("Failed to build template context")
}

/// Builds the contexts of one image deployed to one environment.
#[derive(Debug, Clone)]
pub struct ImageContextGenerator<'a> {
    image_name: String,
    image: &'a ImageDescriptor,
    git_sha: String,
    replica_map: BTreeMap<String, u32>,
    shared: SharedContext,
}

impl<'a> ImageContextGenerator<'a> {
    /// Resolve the shared fields and the persisted scale of `image` in `env`.
    pub fn new(
        config: &'a DevopsConfig,
        scale: &dyn ScaleSource,
        env: &str,
        image: &str,
        git_sha: &str,
    ) -> Result<Self> {
        if git_sha.trim().is_empty() {
            return Err(DevopsError::ConfigError {
                message: "git sha must be present".to_string(),
            }
            .into());
        }
        let descriptor = config.image(image)?;

        let shared = SharedContext {
            monorepo_env: env.to_string(),
            namespace: naming::namespace(config, env)?,
            env_secret_name: naming::secret_name(config)?,
            env_base_secret_key: BASE_SECRET_KEY.to_string(),
            domain_name: naming::domain_name(config, descriptor, env),
            image_path: naming::registry_repo_path(config, image, env, git_sha)?,
        };
        let replica_map = scale.replica_map(env, image)?;

        Ok(Self {
            image_name: image.to_string(),
            image: descriptor,
            git_sha: git_sha.to_string(),
            replica_map,
            shared,
        })
    }

    /// Name of the image.
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// Definition of the image.
    pub fn image(&self) -> &'a ImageDescriptor {
        self.image
    }

    /// The shared fields.
    pub fn shared(&self) -> &SharedContext {
        &self.shared
    }

    /// Context of a deployable workspace.
    pub fn deployment(&self, record: &PackageRecord) -> Result<DeploymentContext> {
        let descriptor = record.deployment.as_ref().ok_or_else(|| DevopsError::DeploymentMissing {
            workspace: record.name.clone(),
        })?;

        let replicas = self.replica_map.get(&record.name).copied().unwrap_or(DEFAULT_REPLICAS);
        let mut extra = descriptor.extra.clone();
        extra.remove("replicas");

        Ok(DeploymentContext {
            project_name: record.name.clone(),
            shared: self.shared.clone(),
            app_name: descriptor.app_name.clone().unwrap_or_else(|| record.name.clone()),
            subdomain: descriptor.subdomain.clone().or_else(|| descriptor.service_name.clone()),
            template: descriptor.template.clone(),
            service_name: descriptor.service_name.clone(),
            port: descriptor.port,
            cron: descriptor.cron.clone(),
            cron_jobs: descriptor.cron_jobs.clone(),
            replicas,
            extra,
        })
    }

    /// Context of the database migration job.
    pub fn db_migrate(&self) -> DbMigrateContext {
        DbMigrateContext {
            shared: self.shared.clone(),
            db_migrate_job_name: naming::db_migrate_job_name(&self.git_sha),
        }
    }

    /// Context of the debug pod.
    pub fn debug(&self) -> DebugContext {
        DebugContext {
            shared: self.shared.clone(),
            debug_pod_name: naming::image_debug_name(&self.image_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImagesFile, ProjectConstants};
    use crate::constants::MISSING_DOMAIN_SENTINEL;
    use crate::discovery::{DeploymentDescriptor, Language};
    use crate::k8s::scale::NoScale;
    use std::path::{Path, PathBuf};

    struct FixedScale(BTreeMap<String, u32>);

    impl ScaleSource for FixedScale {
        fn replica_map(&self, _env: &str, _image: &str) -> Result<BTreeMap<String, u32>> {
            Ok(self.0.clone())
        }
    }

    fn config() -> DevopsConfig {
        let constants = ProjectConstants {
            project_name: Some("acme".to_string()),
            registry_base_url: Some("registry.example.com".to_string()),
            registry_name: Some("images".to_string()),
            ..ProjectConstants::default()
        };
        let mut images = ImagesFile::default();
        let mut main = ImageDescriptor {
            applications: vec!["www".to_string()],
            ..ImageDescriptor::default()
        };
        main.domains.insert("staging".to_string(), "staging.acme.dev".to_string());
        images.images.insert("main".to_string(), main);
        DevopsConfig::from_parts(Path::new("/repo"), constants, images)
    }

    fn record(deployment: Option<DeploymentDescriptor>) -> PackageRecord {
        PackageRecord {
            name: "www".to_string(),
            root_path: PathBuf::from("/repo/apps/www"),
            language: Language::Node,
            dependency_names: vec![],
            deployment,
        }
    }

    #[test]
    fn test_shared_fields() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "staging", "main", "0123456789").unwrap();

        assert_eq!(
            generator.shared(),
            &SharedContext {
                monorepo_env: "staging".to_string(),
                namespace: "acme-staging".to_string(),
                env_secret_name: "acme-secret".to_string(),
                env_base_secret_key: "baseSecret".to_string(),
                domain_name: "staging.acme.dev".to_string(),
                image_path: "registry.example.com/images/acme-staging-main:0123456789".to_string(),
            }
        );
        assert_eq!(generator.db_migrate().db_migrate_job_name, "db-migrate-job-01234567");
        assert_eq!(generator.debug().debug_pod_name, "main-debug");
    }

    #[test]
    fn test_missing_domain_uses_sentinel() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "production", "main", "abc").unwrap();
        assert_eq!(generator.shared().domain_name, MISSING_DOMAIN_SENTINEL);
    }

    #[test]
    fn test_deployment_defaults_and_declared_overrides() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "staging", "main", "abc").unwrap();

        let mut descriptor = DeploymentDescriptor::new("external-service");
        descriptor.service_name = Some("www".to_string());
        descriptor.port = Some(3000);
        let context = generator.deployment(&record(Some(descriptor.clone()))).unwrap();
        assert_eq!(context.project_name, "www");
        assert_eq!(context.app_name, "www");
        assert_eq!(context.subdomain.as_deref(), Some("www"));
        assert_eq!(context.replicas, 1);

        descriptor.app_name = Some("website".to_string());
        descriptor.subdomain = Some("home".to_string());
        descriptor.extra.insert("health_path".to_string(), serde_json::json!("/healthz"));
        let context = generator.deployment(&record(Some(descriptor))).unwrap();
        assert_eq!(context.app_name, "website");
        assert_eq!(context.subdomain.as_deref(), Some("home"));

        let tera = to_tera(&context).unwrap().into_json();
        assert_eq!(tera["health_path"], "/healthz");
        assert_eq!(tera["namespace"], "acme-staging");
        assert_eq!(tera["port"], 3000);
        assert!(tera["cron"].is_null());
        assert_eq!(tera["cron_jobs"], serde_json::json!([]));
    }

    #[test]
    fn test_persisted_scale_wins() {
        let config = config();
        let scale = FixedScale(BTreeMap::from([("www".to_string(), 3)]));
        let generator = ImageContextGenerator::new(&config, &scale, "staging", "main", "abc").unwrap();

        let mut descriptor = DeploymentDescriptor::new("external-service");
        let context = generator.deployment(&record(Some(descriptor.clone()))).unwrap();
        assert_eq!(context.replicas, 3);

        descriptor.extra.insert("replicas".to_string(), serde_json::json!(5));
        let context = generator.deployment(&record(Some(descriptor))).unwrap();
        assert_eq!(context.replicas, 3);
    }

    #[test]
    fn test_declared_replicas_never_reach_the_context() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "staging", "main", "abc").unwrap();

        let mut descriptor = DeploymentDescriptor::new("internal-service");
        descriptor.extra.insert("replicas".to_string(), serde_json::json!(5));
        let context = generator.deployment(&record(Some(descriptor))).unwrap();

        assert_eq!(context.replicas, 1);
        assert!(!context.extra.contains_key("replicas"));
        assert_eq!(to_tera(&context).unwrap().into_json()["replicas"], 1);
    }

    #[test]
    fn test_undeclared_fields_render_empty() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "staging", "main", "abc").unwrap();
        let context = generator.deployment(&record(Some(DeploymentDescriptor::new("worker")))).unwrap();

        let rendered = tera::Tera::one_off(
            "host: [{{ subdomain }}] port: [{{ port }}] jobs: {{ cron_jobs | length }}",
            &to_tera(&context).unwrap(),
            false,
        )
        .unwrap();
        assert_eq!(rendered, "host: [] port: [] jobs: 0");
    }

    #[test]
    fn test_deployment_missing() {
        let config = config();
        let generator = ImageContextGenerator::new(&config, &NoScale, "staging", "main", "abc").unwrap();

        let err = generator.deployment(&record(None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevopsError>(),
            Some(DevopsError::DeploymentMissing { workspace }) if workspace == "www"
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let config = config();
        assert!(ImageContextGenerator::new(&config, &NoScale, "dev", "main", "abc").is_err());
        assert!(ImageContextGenerator::new(&config, &NoScale, "staging", "nope", "abc").is_err());
        assert!(ImageContextGenerator::new(&config, &NoScale, "staging", "main", "").is_err());
    }
}
