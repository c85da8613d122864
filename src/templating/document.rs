//! Parsed manifest documents and their identity.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::fmt;
use std::path::Path;

use super::utils::merge_yaml;
use crate::core::DevopsError;

/// Identity of a manifest document: its `kind` and `metadata.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Resource kind, e.g. `Deployment`
    pub kind: String,
    /// `metadata.name`
    pub name: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.name)
    }
}

/// One YAML document with a non-empty `kind` and `metadata.name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    key: ResourceKey,
    value: Value,
}

impl ManifestDocument {
    /// Wrap a parsed value after checking it is a manifest.
    ///
    /// `path` names the fragment the document came from in errors.
    pub fn from_value(value: Value, path: &Path) -> Result<Self, DevopsError> {
        let malformed = |reason: &str| DevopsError::MalformedTemplate {
            path: path.to_path_buf(),
            reason: reason.to_string(),
            document: serde_yaml::to_string(&value)
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
        };

        if !value.is_mapping() {
            return Err(malformed("a manifest document must be a mapping"));
        }
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .filter(|kind| !kind.is_empty())
            .ok_or_else(|| malformed("missing `kind`"))?;
        let name = value
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed("missing `metadata.name`"))?;

        Ok(Self {
            key: ResourceKey {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            value,
        })
    }

    /// Identity of the document.
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// The document tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Deep merge `overrides` into this document.
    ///
    /// Both documents share one identity, so the key is unchanged.
    pub fn merge(&mut self, overrides: &ManifestDocument) {
        merge_yaml(&mut self.value, &overrides.value);
    }

    /// Serialize the document back to YAML text.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.value)
            .with_context(|| format!("Failed to serialize manifest {}", self.key))
    }
}

/// Parse rendered text as a stream of YAML documents.
///
/// Empty documents (a bare `---`, comments only, `null`) are skipped.
pub fn parse_documents(path: &Path, text: &str) -> Result<Vec<ManifestDocument>, DevopsError> {
    let mut documents = Vec::new();

    for item in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(item).map_err(|e| DevopsError::MalformedTemplate {
            path: path.to_path_buf(),
            reason: format!("invalid YAML: {e}"),
            document: text.trim().to_string(),
        })?;
        if value.is_null() {
            continue;
        }

        documents.push(ManifestDocument::from_value(value, path)?);
    }

    Ok(documents)
}

/// Serialize documents and join them with `---` separators.
pub fn join_documents(documents: &[ManifestDocument]) -> Result<String> {
    let texts = documents
        .iter()
        .map(|document| document.to_yaml().map(|text| text.trim_end().to_string()))
        .collect::<Result<Vec<_>>>()?;

    if texts.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{}\n", texts.join("\n---\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_key_display() {
        let key = ResourceKey {
            kind: "Deployment".to_string(),
            name: "www".to_string(),
        };
        assert_eq!(key.to_string(), "Deployment-www");
    }

    #[test]
    fn test_parse_multiple_documents_skipping_empty_ones() {
        let text = "---\nkind: Service\nmetadata:\n  name: www\n---\n# nothing here\n---\nkind: Deployment\nmetadata:\n  name: www\n---\n";
        let documents = parse_documents(Path::new("svc.yaml"), text).unwrap();

        let keys: Vec<String> = documents.iter().map(|d| d.key().to_string()).collect();
        assert_eq!(keys, vec!["Service-www", "Deployment-www"]);
    }

    #[test]
    fn test_missing_metadata_name_is_malformed() {
        let err = parse_documents(Path::new("/m/broken.yaml"), "kind: Service\nmetadata:\n  labels: {}\n")
            .unwrap_err();

        match err {
            DevopsError::MalformedTemplate { path, reason, document } => {
                assert_eq!(path, Path::new("/m/broken.yaml"));
                assert!(reason.contains("metadata.name"));
                assert!(document.contains("kind: Service"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_kind_and_non_mapping_are_malformed() {
        let err = parse_documents(Path::new("a.yaml"), "metadata:\n  name: x\n").unwrap_err();
        assert!(matches!(err, DevopsError::MalformedTemplate { ref reason, .. } if reason.contains("kind")));

        let err = parse_documents(Path::new("a.yaml"), "- just\n- a list\n").unwrap_err();
        assert!(matches!(err, DevopsError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_directives_and_document_end_markers() {
        let text = "%YAML 1.2\n---\nkind: Service\nmetadata:\n  name: a\n...\n---\nkind: Service\nmetadata:\n  name: b\n";
        let documents = parse_documents(Path::new("f.yaml"), text).unwrap();

        let keys: Vec<String> = documents.iter().map(|d| d.key().to_string()).collect();
        assert_eq!(keys, vec!["Service-a", "Service-b"]);
        assert!(parse_documents(Path::new("f.yaml"), "").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_malformed() {
        let err = parse_documents(Path::new("a.yaml"), "kind: [unclosed\n").unwrap_err();
        assert!(matches!(err, DevopsError::MalformedTemplate { ref reason, .. } if reason.starts_with("invalid YAML")));
    }

    #[test]
    fn test_join_documents() {
        let documents = parse_documents(
            Path::new("a.yaml"),
            "kind: Service\nmetadata:\n  name: a\n---\nkind: Service\nmetadata:\n  name: b\n",
        )
        .unwrap();

        let joined = join_documents(&documents).unwrap();
        assert_eq!(
            joined,
            "kind: Service\nmetadata:\n  name: a\n---\nkind: Service\nmetadata:\n  name: b\n"
        );
        assert_eq!(join_documents(&[]).unwrap(), "");
    }
}
