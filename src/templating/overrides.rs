//! Per-workspace manifest overrides.
//!
//! A workspace may keep a `manifests/` folder next to its package manifest.
//! Every file below it is rendered with the same context as the base
//! template and deep-merged over the base documents with the same identity.
//! Documents with a new identity are appended.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::Context as TeraContext;
use walkdir::WalkDir;

use super::composer::render_fragment;
use super::document::{ManifestDocument, ResourceKey};
use super::renderer::TemplateRenderer;
use crate::constants::OVERRIDE_DIR;
use crate::core::{FileOperation, FileResultExt};

/// Override files of the workspace at `base_path`, sorted by path.
pub fn override_files(base_path: &Path) -> Result<Vec<PathBuf>> {
    let override_dir = base_path.join(OVERRIDE_DIR);
    if !override_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&override_dir) {
        let entry = entry.map_err(std::io::Error::from).with_file_context(
            FileOperation::Walk,
            &override_dir,
            "manifest overrides",
            "overrides",
        )?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Render the overrides of `base_path` and merge them over `base_documents`.
///
/// Returns the base documents unchanged when the workspace has no override
/// folder.
pub fn apply_overrides(
    base_path: &Path,
    base_documents: Vec<ManifestDocument>,
    context: &TeraContext,
) -> Result<Vec<ManifestDocument>> {
    let files = override_files(base_path)?;
    if files.is_empty() {
        return Ok(base_documents);
    }

    let renderer = TemplateRenderer::new();
    let mut overrides = Vec::new();
    for file in &files {
        overrides.extend(render_fragment(&renderer, file, context)?);
    }

    tracing::debug!(
        "Merging {} override documents from {} files in {}",
        overrides.len(),
        files.len(),
        base_path.display()
    );
    Ok(merge_documents(base_documents, overrides))
}

/// Merge `overrides` over `base` by [`ResourceKey`].
///
/// Within one side a repeated identity replaces the earlier document and keeps
/// its position. Base order is kept; override-only identities follow in
/// override order.
pub fn merge_documents(
    base: Vec<ManifestDocument>,
    overrides: Vec<ManifestDocument>,
) -> Vec<ManifestDocument> {
    let (mut order, mut documents) = keyed(base);
    let (override_order, mut override_documents) = keyed(overrides);

    for key in override_order {
        let Some(override_document) = override_documents.remove(&key) else {
            continue;
        };
        match documents.get_mut(&key) {
            Some(document) => document.merge(&override_document),
            None => {
                order.push(key.clone());
                documents.insert(key, override_document);
            }
        }
    }

    order.into_iter().filter_map(|key| documents.remove(&key)).collect()
}

fn keyed(
    documents: Vec<ManifestDocument>,
) -> (Vec<ResourceKey>, HashMap<ResourceKey, ManifestDocument>) {
    let mut order = Vec::new();
    let mut by_key = HashMap::new();
    for document in documents {
        let key = document.key().clone();
        if by_key.insert(key.clone(), document).is_none() {
            order.push(key);
        }
    }
    (order, by_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templating::parse_documents;

    fn documents(text: &str) -> Vec<ManifestDocument> {
        parse_documents(Path::new("test.yaml"), text).unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_sequences_replaced_and_new_identities_appended() {
        let base = documents(
            "kind: Deployment\nmetadata:\n  name: www\nspec:\n  replicas: 1\n  args: [1, 2]\n---\nkind: Service\nmetadata:\n  name: www\n",
        );
        let overrides = documents(
            "kind: ConfigMap\nmetadata:\n  name: extra\n---\nkind: Deployment\nmetadata:\n  name: www\nspec:\n  args: [3]\n",
        );

        let merged = merge_documents(base, overrides);
        let keys: Vec<String> = merged.iter().map(|d| d.key().to_string()).collect();
        assert_eq!(keys, vec!["Deployment-www", "Service-www", "ConfigMap-extra"]);

        let spec = &merged[0].value()["spec"];
        assert_eq!(spec["replicas"].as_u64(), Some(1));
        assert_eq!(spec["args"], serde_yaml::from_str::<serde_yaml::Value>("[3]").unwrap());
    }

    #[test]
    fn test_repeated_identity_later_wins() {
        let base = documents(
            "kind: Service\nmetadata:\n  name: a\n  labels: {v: '1'}\n---\nkind: Service\nmetadata:\n  name: a\n",
        );
        let merged = merge_documents(base, Vec::new());
        assert_eq!(merged.len(), 1);
        assert!(merged[0].value()["metadata"].get("labels").is_none());
    }

    #[test]
    fn test_no_override_folder_returns_base() {
        let temp = tempfile::tempdir().unwrap();
        let base = documents("kind: Service\nmetadata:\n  name: www\n");

        let result = apply_overrides(temp.path(), base.clone(), &TeraContext::new()).unwrap();
        assert_eq!(result, base);
    }

    #[test]
    fn test_empty_override_folder_returns_base() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("manifests/nested")).unwrap();
        let base = documents("kind: Service\nmetadata:\n  name: www\nspec:\n  ports: [80]\n");

        let result = apply_overrides(temp.path(), base.clone(), &TeraContext::new()).unwrap();
        assert_eq!(result, base);
    }

    #[test]
    fn test_renders_override_files_recursively_in_path_order() {
        let temp = tempfile::tempdir().unwrap();
        write(
            temp.path(),
            "manifests/b/replicas.yaml",
            "kind: Deployment\nmetadata:\n  name: {{ app_name }}\nspec:\n  replicas: 5\n",
        );
        write(
            temp.path(),
            "manifests/a.yaml",
            "kind: Deployment\nmetadata:\n  name: {{ app_name }}\nspec:\n  replicas: 2\n  paused: true\n",
        );

        let mut context = TeraContext::new();
        context.insert("app_name", "www");
        let base = documents("kind: Deployment\nmetadata:\n  name: www\nspec:\n  replicas: 1\n");

        let merged = apply_overrides(temp.path(), base, &context).unwrap();
        assert_eq!(merged.len(), 1);
        // b/replicas.yaml sorts last and replaces a.yaml's document of the same identity
        assert_eq!(merged[0].value()["spec"]["replicas"].as_u64(), Some(5));
        assert!(merged[0].value()["spec"].get("paused").is_none());
    }

    #[test]
    fn test_override_files_sorted() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "manifests/z.yaml", "");
        write(temp.path(), "manifests/a/b.yaml", "");

        let files = override_files(temp.path()).unwrap();
        assert_eq!(
            files,
            vec![temp.path().join("manifests/a/b.yaml"), temp.path().join("manifests/z.yaml")]
        );
    }
}
