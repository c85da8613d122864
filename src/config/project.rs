//! Project-wide constants (`.devops/config/constants.yaml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contents of `constants.yaml`.
///
/// ```yaml
/// project-name: acme
/// registry-base-url: registry.example.com
/// registry-name: acme-images
/// extra-remote-environments: [qa]
/// domains:
///   staging: staging.acme.dev
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConstants {
    /// Project name; prefixes namespaces, secrets and image names
    #[serde(default)]
    pub project_name: Option<String>,
    /// Container registry host
    #[serde(default)]
    pub registry_base_url: Option<String>,
    /// Registry repository name
    #[serde(default)]
    pub registry_name: Option<String>,
    /// Fallback domain per environment for images without their own
    #[serde(default)]
    pub domains: BTreeMap<String, String>,
    /// Remote environments beyond `staging` and `production`
    #[serde(default)]
    pub extra_remote_environments: Vec<String>,
    /// Everything else in the file
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}
