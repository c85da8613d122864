//! Names derived from the project constants.
//!
//! Every cluster-side name the generators emit (namespace, secret, image
//! path, job and pod names) is built here so the templates and the external
//! apply/delete tooling agree on them.

use anyhow::Result;

use crate::config::{DevopsConfig, ImageDescriptor};
use crate::constants::{MISSING_DOMAIN_SENTINEL, SHORT_SHA_LEN};
use crate::core::DevopsError;

/// Fail unless `env` is a remote environment of the project.
pub fn validate_env(config: &DevopsConfig, env: &str) -> Result<()> {
    let supported = config.remote_environments();
    if env.is_empty() || !supported.iter().any(|candidate| candidate == env) {
        return Err(DevopsError::UnsupportedEnvironment {
            env: env.to_string(),
            supported,
        }
        .into());
    }
    Ok(())
}

/// `<project-name>-<env>`
pub fn namespace(config: &DevopsConfig, env: &str) -> Result<String> {
    validate_env(config, env)?;
    Ok(format!("{}-{env}", config.project_name()?))
}

/// `<project-name>-secret`
pub fn secret_name(config: &DevopsConfig) -> Result<String> {
    Ok(format!("{}-secret", config.project_name()?))
}

/// `<image>-debug`
pub fn image_debug_name(image: &str) -> String {
    format!("{image}-debug")
}

/// Name of the config map holding an image's version and scale.
pub fn image_config_map(image: &str) -> String {
    format!("image-config-{image}")
}

/// `<project-name>-<env>-<image>`
pub fn registry_repo_name(config: &DevopsConfig, image: &str, env: &str) -> Result<String> {
    validate_env(config, env)?;
    Ok(format!("{}-{env}-{image}", config.project_name()?))
}

/// `<registry-base-url>/<registry-name>/<project-name>-<env>-<image>:<git-sha>`
pub fn registry_repo_path(
    config: &DevopsConfig,
    image: &str,
    env: &str,
    git_sha: &str,
) -> Result<String> {
    Ok(format!(
        "{}/{}/{}:{git_sha}",
        config.registry_base_url()?,
        config.registry_name()?,
        registry_repo_name(config, image, env)?
    ))
}

/// `db-migrate-job-<first 8 characters of the sha>`
pub fn db_migrate_job_name(git_sha: &str) -> String {
    let short: String = git_sha.chars().take(SHORT_SHA_LEN).collect();
    format!("db-migrate-job-{short}")
}

/// Domain of the image in `env`, or the missing-domain sentinel.
///
/// The sentinel is caught by `ensure_complete` once the manifest is
/// rendered, so templates that never use the domain still work.
pub fn domain_name(config: &DevopsConfig, image: &ImageDescriptor, env: &str) -> String {
    config
        .domain_for(image, env)
        .unwrap_or(MISSING_DOMAIN_SENTINEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImagesFile, ProjectConstants};
    use std::path::Path;

    fn config() -> DevopsConfig {
        let constants = ProjectConstants {
            project_name: Some("acme".to_string()),
            registry_base_url: Some("registry.example.com".to_string()),
            registry_name: Some("images".to_string()),
            extra_remote_environments: vec!["qa".to_string()],
            ..ProjectConstants::default()
        };
        DevopsConfig::from_parts(Path::new("/repo"), constants, ImagesFile::default())
    }

    #[test]
    fn test_names() {
        let config = config();
        assert_eq!(namespace(&config, "staging").unwrap(), "acme-staging");
        assert_eq!(secret_name(&config).unwrap(), "acme-secret");
        assert_eq!(image_debug_name("main"), "main-debug");
        assert_eq!(image_config_map("main"), "image-config-main");
        assert_eq!(
            registry_repo_path(&config, "main", "qa", "abc123").unwrap(),
            "registry.example.com/images/acme-qa-main:abc123"
        );
    }

    #[test]
    fn test_db_migrate_job_name_uses_short_sha() {
        assert_eq!(db_migrate_job_name("0123456789abcdef"), "db-migrate-job-01234567");
        assert_eq!(db_migrate_job_name("abc"), "db-migrate-job-abc");
    }

    #[test]
    fn test_unsupported_environment() {
        let config = config();
        for env in ["development", ""] {
            let err = namespace(&config, env).unwrap_err();
            match err.downcast_ref::<DevopsError>().unwrap() {
                DevopsError::UnsupportedEnvironment { supported, .. } => {
                    assert_eq!(supported, &vec!["staging", "production", "qa"]);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_domain_falls_back_to_sentinel() {
        let config = config();
        let mut image = ImageDescriptor::default();
        image.domains.insert("staging".to_string(), "staging.acme.dev".to_string());

        assert_eq!(domain_name(&config, &image, "staging"), "staging.acme.dev");
        assert_eq!(domain_name(&config, &image, "production"), MISSING_DOMAIN_SENTINEL);
    }
}
