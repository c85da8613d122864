//! Node workspace loader (`package.json`).

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use super::processor::{ConvertedPackage, PackageDataProcessor, expand_members};
use super::{DeploymentDescriptor, Language, PackageRecord};
use crate::core::{DevopsError, FileOps};

const PACKAGE_JSON: &str = "package.json";

/// `workspaces` of the root manifest: npm/yarn list or yarn's object form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceGlobs {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RootPackageJson {
    #[serde(default)]
    workspaces: Option<WorkspaceGlobs>,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    deployment: Option<DeploymentDescriptor>,
}

/// Load every Node workspace declared by `<root>/package.json`.
///
/// Only `dependencies` take part in the graph; `devDependencies` never ship
/// with an image. A monorepo without a root `package.json` has no Node
/// workspaces.
pub fn discover_node_workspaces(root: &Path) -> Result<Vec<PackageRecord>> {
    let root_manifest = root.join(PACKAGE_JSON);
    if !root_manifest.is_file() {
        tracing::debug!("No {} at {}", PACKAGE_JSON, root.display());
        return Ok(Vec::new());
    }

    let text = FileOps::read_with_context(&root_manifest, "root workspace globs", "discovery")?;
    let root_package: RootPackageJson =
        serde_json::from_str(&text).map_err(|e| DevopsError::ManifestParseError {
            file: root_manifest.clone(),
            reason: e.to_string(),
        })?;

    let (include, exclude): (Vec<String>, Vec<String>) = match root_package.workspaces {
        Some(WorkspaceGlobs::List(globs)) | Some(WorkspaceGlobs::Object { packages: globs }) => {
            globs.into_iter().partition(|glob| !glob.starts_with('!'))
        }
        None => (Vec::new(), Vec::new()),
    };
    let exclude: Vec<String> =
        exclude.into_iter().map(|glob| glob.trim_start_matches('!').to_string()).collect();

    let manifests = expand_members(root, &include, &exclude, PACKAGE_JSON)?;
    let processor = PackageDataProcessor::load(
        Language::Node,
        manifests,
        |text| serde_json::from_str::<PackageJson>(text).map_err(|e| e.to_string()),
        |package| package.name.clone(),
    )?;

    Ok(processor.convert(|package| ConvertedPackage {
        dependency_names: package.dependencies.keys().cloned().collect(),
        deployment: package.deployment,
    }))
}
