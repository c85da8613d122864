//! Container image definitions (`.devops/config/images.yaml`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{DevopsError, similar_names};
use crate::discovery::Language;

/// One deployable container image.
///
/// ```yaml
/// images:
///   main-node:
///     language: node
///     applications: ["@local/www", "@local/worker"]
///     debug-template: debug
///     domains:
///       staging: staging.example.com
///       production: example.com
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Language whose dependency graph builds the image
    #[serde(default)]
    pub language: Language,
    /// Entry-point workspaces of the image
    #[serde(default)]
    pub applications: Vec<String>,
    /// Template of the debug pod
    #[serde(default, rename = "debug-template", skip_serializing_if = "Option::is_none")]
    pub debug_template: Option<String>,
    /// Domain name per environment
    #[serde(default)]
    pub domains: BTreeMap<String, String>,
}

/// Lookup of image definitions by name.
pub trait ImageCatalog {
    /// The image called `name`, or [`DevopsError::ImageNotFound`].
    fn image(&self, name: &str) -> Result<&ImageDescriptor>;

    /// Every image name, sorted.
    fn image_names(&self) -> Vec<&str>;
}

/// Contents of `images.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagesFile {
    /// Images by name
    #[serde(default)]
    pub images: BTreeMap<String, ImageDescriptor>,
}

impl ImageCatalog for ImagesFile {
    fn image(&self, name: &str) -> Result<&ImageDescriptor> {
        self.images.get(name).ok_or_else(|| {
            DevopsError::ImageNotFound {
                name: name.to_string(),
                suggestions: similar_names(name, self.images.keys().map(String::as_str)),
            }
            .into()
        })
    }

    fn image_names(&self) -> Vec<&str> {
        self.images.keys().map(String::as_str).collect()
    }
}
