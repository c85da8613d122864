//! Replica counts recorded outside the repository.
//!
//! Operators scale workspaces at runtime; the chosen counts are kept in the
//! `image-config-<image>` config map so a redeploy does not reset them. The
//! map's `data` object looks like:
//!
//! ```json
//! { "version": "4f2a9c1", "scale": "{\"@local/www\": 3}" }
//! ```
//!
//! `scale` is itself a JSON document encoded as a string. Reading the config
//! map from the cluster is left to the caller; [`ConfigMapScale`] parses the
//! data it obtained.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::naming::image_config_map;
use crate::core::{DevopsError, FileOps};

/// Provides the persisted replica count of each workspace of an image.
pub trait ScaleSource {
    /// Workspace name -> replica count for `image` in `env`.
    fn replica_map(&self, env: &str, image: &str) -> Result<BTreeMap<String, u32>>;
}

/// No persisted scale: every workspace uses its declared or default count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScale;

impl ScaleSource for NoScale {
    fn replica_map(&self, _env: &str, _image: &str) -> Result<BTreeMap<String, u32>> {
        Ok(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ImageConfigData {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    scale: Option<String>,
}

/// Scale read from the data of an image config map.
#[derive(Debug, Clone, Default)]
pub struct ConfigMapScale {
    data: ImageConfigData,
}

impl ConfigMapScale {
    /// Parse the config map `data` object as JSON.
    ///
    /// Empty input means the config map does not exist yet.
    pub fn from_data_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let data = serde_json::from_str(text).map_err(|e| DevopsError::ConfigError {
            message: format!("Error parsing image config map data: {e}. Received: {text}"),
        })?;
        Ok(Self { data })
    }

    /// Read the config map data from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = FileOps::read_with_context(path, "image config map data", "scale")?;
        Self::from_data_json(&text)
    }

    /// Deployed version recorded in the config map.
    pub fn version(&self) -> Option<&str> {
        self.data.version.as_deref()
    }
}

impl ScaleSource for ConfigMapScale {
    fn replica_map(&self, env: &str, image: &str) -> Result<BTreeMap<String, u32>> {
        let Some(scale) = self.data.scale.as_deref().filter(|scale| !scale.trim().is_empty())
        else {
            return Ok(BTreeMap::new());
        };

        let replicas: BTreeMap<String, u32> =
            serde_json::from_str(scale).map_err(|e| DevopsError::ConfigError {
                message: format!(
                    "Error parsing config map {} in {env} for key scale: {e}. Received: {scale}",
                    image_config_map(image)
                ),
            })?;
        tracing::debug!("Loaded scale for {} workspaces of image {}", replicas.len(), image);
        Ok(replicas)
    }
}
