//! Language-independent part of workspace loading.
//!
//! Both loaders follow the same two passes: parse every member manifest and
//! collect the workspace names, then convert each manifest into a
//! [`PackageRecord`] whose dependencies are filtered against those names.

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use super::{DeploymentDescriptor, Language, PackageRecord};
use crate::constants::IGNORED_PATHS;
use crate::core::{DevopsError, FileOperation, FileOps, FileResultExt};

/// What a loader extracts from one parsed manifest.
#[derive(Debug, Clone, Default)]
pub struct ConvertedPackage {
    /// Every declared dependency name, workspace or not
    pub dependency_names: Vec<String>,
    /// The deployment descriptor, if declared
    pub deployment: Option<DeploymentDescriptor>,
}

/// Parsed manifests of one language, plus the set of workspace names.
pub struct PackageDataProcessor<T> {
    language: Language,
    loaded: Vec<(PathBuf, String, T)>,
    workspace_names: HashSet<String>,
}

impl<T> PackageDataProcessor<T> {
    /// Read and parse every manifest file.
    ///
    /// `parse` turns the file text into the manifest type; its error message
    /// is reported as [`DevopsError::ManifestParseError`]. Manifests without
    /// a name cannot be depended on and are skipped.
    pub fn load<P, N>(
        language: Language,
        manifest_paths: impl IntoIterator<Item = PathBuf>,
        parse: P,
        name_of: N,
    ) -> Result<Self>
    where
        P: Fn(&str) -> Result<T, String>,
        N: Fn(&T) -> Option<String>,
    {
        let mut loaded = Vec::new();
        let mut workspace_names = HashSet::new();

        for manifest_path in manifest_paths {
            if is_ignored(&manifest_path) {
                tracing::debug!("Ignoring {}", manifest_path.display());
                continue;
            }

            let text = FileOps::read_with_context(
                &manifest_path,
                &format!("{language} workspace manifest"),
                "discovery",
            )?;
            let manifest = parse(&text).map_err(|reason| DevopsError::ManifestParseError {
                file: manifest_path.clone(),
                reason,
            })?;

            let Some(name) = name_of(&manifest) else {
                tracing::warn!("Skipping {} without a package name", manifest_path.display());
                continue;
            };

            let root_path = manifest_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            workspace_names.insert(name.clone());
            loaded.push((root_path, name, manifest));
        }

        tracing::debug!("Loaded {} {} workspaces", loaded.len(), language);
        Ok(Self {
            language,
            loaded,
            workspace_names,
        })
    }

    /// Keep workspace names only, in order, without duplicates.
    pub fn filter_dependencies(&self, names: Vec<String>) -> Vec<String> {
        keep_workspaces(&self.workspace_names, names)
    }

    /// Turn every loaded manifest into a [`PackageRecord`].
    pub fn convert<F>(self, mut convert: F) -> Vec<PackageRecord>
    where
        F: FnMut(T) -> ConvertedPackage,
    {
        let Self {
            language,
            loaded,
            workspace_names,
        } = self;

        loaded
            .into_iter()
            .map(|(root_path, name, manifest)| {
                let converted = convert(manifest);
                PackageRecord {
                    name,
                    root_path,
                    language,
                    dependency_names: keep_workspaces(
                        &workspace_names,
                        converted.dependency_names,
                    ),
                    deployment: converted.deployment,
                }
            })
            .collect()
    }
}

fn keep_workspaces(workspace_names: &HashSet<String>, names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| workspace_names.contains(name) && seen.insert(name.clone()))
        .collect()
}

/// Whether `path` lies below a directory that never holds workspaces.
pub(crate) fn is_ignored(path: &Path) -> bool {
    path.components().any(|component| {
        let component = component.as_os_str();
        IGNORED_PATHS
            .iter()
            .any(|ignored| component == ignored.trim_end_matches('/'))
    })
}

/// Expand member globs relative to `root` into manifest file paths.
///
/// Each include pattern names member directories; `manifest_file` is looked
/// up inside every match. Directories matching an exclude pattern are
/// dropped. The result is sorted and free of duplicates.
pub(crate) fn expand_members(
    root: &Path,
    include: &[String],
    exclude: &[String],
    manifest_file: &str,
) -> Result<Vec<PathBuf>> {
    let excluded = exclude
        .iter()
        .map(|pattern| {
            let full = root.join(pattern);
            glob::Pattern::new(&full.to_string_lossy())
                .with_context(|| format!("Invalid exclude pattern '{pattern}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut manifests = BTreeSet::new();
    for pattern in include {
        let full = root.join(pattern).join(manifest_file);
        let entries = glob::glob(&full.to_string_lossy())
            .with_context(|| format!("Invalid workspace pattern '{pattern}'"))?;

        for entry in entries {
            let manifest = entry.map_err(glob::GlobError::into_error).with_file_context(
                FileOperation::Glob,
                &full,
                "workspace members",
                "discovery",
            )?;
            let member_dir = manifest.parent().unwrap_or(root);
            if excluded.iter().any(|exclusion| exclusion.matches_path(member_dir)) {
                tracing::debug!("Excluding {}", member_dir.display());
                continue;
            }
            manifests.insert(manifest);
        }
    }

    Ok(manifests.into_iter().collect())
}
