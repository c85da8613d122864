//! Template composition from the fragment index.
//!
//! `.devops/manifests/_index.yaml` maps each template name to its fragment
//! files, relative to `.devops/manifests`:
//!
//! ```yaml
//! external-service:
//!   - service.yaml
//!   - deployment.yaml
//!   - ingress.yaml
//! db-migrate:
//!   - jobs/db-migrate.yaml
//! ```
//!
//! The index is read once when the composer is loaded.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::Context as TeraContext;

use super::document::{ManifestDocument, parse_documents};
use super::renderer::TemplateRenderer;
use crate::constants::MANIFEST_INDEX_FILE;
use crate::core::{DevopsError, FileOps, similar_names};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IndexEntry {
    Many(Vec<String>),
    One(String),
}

/// Renders named templates from their fragments.
#[derive(Debug, Clone)]
pub struct TemplateComposer {
    manifest_dir: PathBuf,
    index_path: PathBuf,
    index: BTreeMap<String, Vec<String>>,
    renderer: TemplateRenderer,
}

impl TemplateComposer {
    /// Read the template index of `manifest_dir`.
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        let index_path = manifest_dir.join(MANIFEST_INDEX_FILE);
        if !index_path.is_file() {
            return Err(DevopsError::ConfigError {
                message: format!("Template index {} does not exist", index_path.display()),
            }
            .into());
        }

        let text = FileOps::read_with_context(&index_path, "template index", "composer")?;
        let raw: BTreeMap<String, Option<IndexEntry>> = if text.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(&text).map_err(|e| DevopsError::ConfigError {
                message: format!("Invalid template index {}: {e}", index_path.display()),
            })?
        };

        let index: BTreeMap<String, Vec<String>> = raw
            .into_iter()
            .map(|(name, entry)| {
                let fragments = match entry {
                    Some(IndexEntry::Many(fragments)) => fragments,
                    Some(IndexEntry::One(fragment)) => vec![fragment],
                    None => Vec::new(),
                };
                (name, fragments)
            })
            .collect();

        tracing::debug!("Loaded {} templates from {}", index.len(), index_path.display());
        Ok(Self::from_index(manifest_dir, index))
    }

    /// Build a composer over an index already in memory.
    pub fn from_index(manifest_dir: &Path, index: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            manifest_dir: manifest_dir.to_path_buf(),
            index_path: manifest_dir.join(MANIFEST_INDEX_FILE),
            index,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Every template name of the index, sorted.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Absolute paths of the fragments of `name`, in index order.
    pub fn fragments(&self, name: &str) -> Result<Vec<PathBuf>> {
        let fragments = self.index.get(name).ok_or_else(|| DevopsError::TemplateNotFound {
            name: name.to_string(),
            index: self.index_path.clone(),
            suggestions: similar_names(name, self.template_names()),
        })?;

        if fragments.is_empty() {
            return Err(DevopsError::EmptyTemplate {
                name: name.to_string(),
                index: self.index_path.clone(),
            }
            .into());
        }

        Ok(fragments.iter().map(|fragment| self.manifest_dir.join(fragment)).collect())
    }

    /// Render every fragment of `name` and parse the documents.
    pub fn render_template(
        &self,
        name: &str,
        context: &TeraContext,
    ) -> Result<Vec<ManifestDocument>> {
        let mut documents = Vec::new();
        for path in self.fragments(name)? {
            if !path.is_file() {
                return Err(DevopsError::FragmentNotFound {
                    template: name.to_string(),
                    path,
                }
                .into());
            }
            documents.extend(render_fragment(&self.renderer, &path, context)?);
        }

        tracing::debug!("Template {} produced {} documents", name, documents.len());
        Ok(documents)
    }
}

/// Read, render and parse one fragment file.
pub(crate) fn render_fragment(
    renderer: &TemplateRenderer,
    path: &Path,
    context: &TeraContext,
) -> Result<Vec<ManifestDocument>> {
    let source = FileOps::read_with_context(path, "template fragment", "composer")?;
    let rendered = renderer.render(&source, context).map_err(|e| {
        let reason = match e.line {
            Some(line) => format!("template rendering failed at line {line}: {}", e.message),
            None => format!("template rendering failed: {}", e.message),
        };
        DevopsError::MalformedTemplate {
            path: path.to_path_buf(),
            reason,
            document: source.trim().to_string(),
        }
    })?;

    Ok(parse_documents(path, &rendered)?)
}
