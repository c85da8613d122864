//! Image-to-workspace resolution.
//!
//! An image's build context is every workspace reachable from its
//! applications in the graph of the image's language. Both directions are
//! computed once when the resolver is built:
//!
//! - image -> workspaces ([`ImageResolver::descendants_of`])
//! - workspace -> images ([`ImageResolver::images_containing`])

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::Monorepo;
use crate::config::ImageCatalog;
use crate::core::{DevopsError, similar_names};
use crate::discovery::PackageRecord;

/// Precomputed image membership.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    descendants: BTreeMap<String, Vec<PackageRecord>>,
    images_by_workspace: BTreeMap<String, BTreeSet<String>>,
    known_workspaces: HashSet<String>,
}

impl ImageResolver {
    /// Resolve every image of `catalog` against the monorepo.
    ///
    /// Fails when an image lists an application unknown to its language.
    pub fn build(monorepo: &Monorepo, catalog: &dyn ImageCatalog) -> Result<Self> {
        let mut descendants = BTreeMap::new();
        let mut images_by_workspace: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for image_name in catalog.image_names() {
            let image = catalog.image(image_name)?;
            let graph = monorepo.graph(image.language);

            let mut seen = HashSet::new();
            let mut records = Vec::new();
            for application in &image.applications {
                let reachable = graph.dependents_of(application).with_context(|| {
                    format!("Resolving application {application} of image {image_name}")
                })?;
                for name in reachable {
                    if !seen.insert(name.clone()) {
                        continue;
                    }
                    if let Some(record) = monorepo.index().record(image.language, &name) {
                        records.push(record.clone());
                    }
                    images_by_workspace.entry(name).or_default().insert(image_name.to_string());
                }
            }

            tracing::debug!("Image {} contains {} workspaces", image_name, records.len());
            descendants.insert(image_name.to_string(), records);
        }

        Ok(Self {
            descendants,
            images_by_workspace,
            known_workspaces: monorepo.index().names().map(str::to_string).collect(),
        })
    }

    /// Workspaces in the build context of `image`, first-seen order.
    pub fn descendants_of(&self, image: &str) -> Result<Vec<&PackageRecord>> {
        self.descendants.get(image).map(|records| records.iter().collect()).ok_or_else(|| {
            DevopsError::ImageNotFound {
                name: image.to_string(),
                suggestions: similar_names(image, self.descendants.keys().map(String::as_str)),
            }
            .into()
        })
    }

    /// Names of the images whose build context contains `workspace`, sorted.
    ///
    /// A known workspace that belongs to no image yields an empty list.
    pub fn images_containing(&self, workspace: &str) -> Result<Vec<String>> {
        if !self.known_workspaces.contains(workspace) {
            return Err(DevopsError::WorkspaceNotFound {
                name: workspace.to_string(),
                suggestions: similar_names(
                    workspace,
                    self.known_workspaces.iter().map(String::as_str),
                ),
            }
            .into());
        }

        Ok(self
            .images_by_workspace
            .get(workspace)
            .map(|images| images.iter().cloned().collect())
            .unwrap_or_default())
    }
}
