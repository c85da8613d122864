//! Python workspace loader (`pyproject.toml`, uv workspaces).

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use super::processor::{ConvertedPackage, PackageDataProcessor, expand_members};
use super::{DeploymentDescriptor, Language, PackageRecord};
use crate::core::{DevopsError, FileOps};

const PYPROJECT_TOML: &str = "pyproject.toml";

#[derive(Debug, Default, Deserialize)]
struct RootPyproject {
    #[serde(default)]
    tool: RootTool,
}

#[derive(Debug, Default, Deserialize)]
struct RootTool {
    #[serde(default)]
    uv: UvTool,
}

#[derive(Debug, Default, Deserialize)]
struct UvTool {
    #[serde(default)]
    workspace: UvWorkspace,
}

#[derive(Debug, Default, Deserialize)]
struct UvWorkspace {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Pyproject {
    #[serde(default)]
    project: Option<Project>,
    #[serde(default)]
    tool: Option<MemberTool>,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MemberTool {
    #[serde(default)]
    devops: Option<DevopsTool>,
}

#[derive(Debug, Deserialize)]
struct DevopsTool {
    #[serde(default)]
    deployment: Option<DeploymentDescriptor>,
}

/// Distribution name of a PEP 508 requirement string.
///
/// `"shared-lib[extra]>=1.0; python_version > '3.9'"` yields `shared-lib`.
pub fn requirement_name(requirement: &str) -> Option<&str> {
    let re = Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)").ok()?;
    re.captures(requirement).and_then(|captures| captures.get(1)).map(|name| name.as_str())
}

/// Load every Python workspace declared by `<root>/pyproject.toml`.
pub fn discover_python_workspaces(root: &Path) -> Result<Vec<PackageRecord>> {
    let root_manifest = root.join(PYPROJECT_TOML);
    if !root_manifest.is_file() {
        tracing::debug!("No {} at {}", PYPROJECT_TOML, root.display());
        return Ok(Vec::new());
    }

    let text = FileOps::read_with_context(&root_manifest, "uv workspace members", "discovery")?;
    let root_project: RootPyproject =
        toml::from_str(&text).map_err(|e| DevopsError::ManifestParseError {
            file: root_manifest.clone(),
            reason: e.to_string(),
        })?;
    let workspace = root_project.tool.uv.workspace;

    let manifests = expand_members(root, &workspace.members, &workspace.exclude, PYPROJECT_TOML)?;
    let processor = PackageDataProcessor::load(
        Language::Python,
        manifests,
        |text| toml::from_str::<Pyproject>(text).map_err(|e| e.to_string()),
        |pyproject| pyproject.project.as_ref().and_then(|project| project.name.clone()),
    )?;

    Ok(processor.convert(|pyproject| ConvertedPackage {
        dependency_names: pyproject
            .project
            .map(|project| {
                project
                    .dependencies
                    .iter()
                    .filter_map(|requirement| requirement_name(requirement))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        deployment: pyproject.tool.and_then(|tool| tool.devops).and_then(|devops| devops.deployment),
    }))
}
