//! Configuration management for devops
//!
//! All monorepo-level configuration lives below `.devops/`:
//!
//! ```text
//! .devops/
//! ├── config/
//! │   ├── constants.yaml   # project name, registry, extra environments
//! │   └── images.yaml      # image definitions
//! └── manifests/
//!     ├── _index.yaml      # template name -> fragment files
//!     └── ...              # fragments
//! ```
//!
//! # Modules
//!
//! - `parser` - YAML parsing with file path context
//! - `project` - [`ProjectConstants`] from `constants.yaml`
//! - `images` - [`ImageDescriptor`] and the [`ImageCatalog`] lookup
//!
//! Both files are optional when loading. Accessors that need a value fail
//! with [`DevopsError::MissingConstant`] naming the key and the file, so
//! commands that never touch the registry work without a complete
//! `constants.yaml`.

mod images;
mod parser;
mod project;

pub use images::{ImageCatalog, ImageDescriptor, ImagesFile};
pub use parser::parse_config;
pub use project::ProjectConstants;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR, CONSTANTS_FILE, DEFAULT_REMOTE_ENVS, DEVOPS_DIR, IMAGES_FILE, MANIFESTS_DIR,
};
use crate::core::DevopsError;

/// Loaded `.devops` configuration of one monorepo.
#[derive(Debug, Clone)]
pub struct DevopsConfig {
    root: PathBuf,
    constants_path: PathBuf,
    constants: ProjectConstants,
    images: ImagesFile,
}

impl DevopsConfig {
    /// Load `constants.yaml` and `images.yaml` of the monorepo at `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config_dir = root.join(DEVOPS_DIR).join(CONFIG_DIR);
        let constants_path = config_dir.join(CONSTANTS_FILE);
        let constants: ProjectConstants = parse_config(&constants_path)?;
        let images: ImagesFile = parse_config(&config_dir.join(IMAGES_FILE))?;

        tracing::debug!(
            "Loaded configuration with {} images from {}",
            images.images.len(),
            config_dir.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            constants_path,
            constants,
            images,
        })
    }

    /// Build a configuration from values already in memory.
    pub fn from_parts(root: &Path, constants: ProjectConstants, images: ImagesFile) -> Self {
        Self {
            root: root.to_path_buf(),
            constants_path: root.join(DEVOPS_DIR).join(CONFIG_DIR).join(CONSTANTS_FILE),
            constants,
            images,
        }
    }

    /// Monorepo root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the template index and fragments.
    pub fn manifests_dir(&self) -> PathBuf {
        self.root.join(DEVOPS_DIR).join(MANIFESTS_DIR)
    }

    /// Raw project constants.
    pub fn constants(&self) -> &ProjectConstants {
        &self.constants
    }

    /// Image definitions.
    pub fn images(&self) -> &ImagesFile {
        &self.images
    }

    /// `project-name`, required.
    pub fn project_name(&self) -> Result<&str> {
        self.require("project-name", self.constants.project_name.as_deref())
    }

    /// `registry-base-url`, required.
    pub fn registry_base_url(&self) -> Result<&str> {
        self.require("registry-base-url", self.constants.registry_base_url.as_deref())
    }

    /// `registry-name`, required.
    pub fn registry_name(&self) -> Result<&str> {
        self.require("registry-name", self.constants.registry_name.as_deref())
    }

    /// Environments manifests can be generated for.
    pub fn remote_environments(&self) -> Vec<String> {
        let mut envs: Vec<String> = DEFAULT_REMOTE_ENVS.iter().map(|env| env.to_string()).collect();
        for env in &self.constants.extra_remote_environments {
            if !envs.contains(env) {
                envs.push(env.clone());
            }
        }
        envs
    }

    /// Domain of `image` in `env`: the image's own mapping first, then the
    /// project-wide `domains` of `constants.yaml`.
    pub fn domain_for<'a>(&'a self, image: &'a ImageDescriptor, env: &str) -> Option<&'a str> {
        image
            .domains
            .get(env)
            .or_else(|| self.constants.domains.get(env))
            .map(String::as_str)
    }

    fn require<'a>(&self, key: &str, value: Option<&'a str>) -> Result<&'a str> {
        value.filter(|value| !value.is_empty()).ok_or_else(|| {
            DevopsError::MissingConstant {
                key: key.to_string(),
                file: self.constants_path.clone(),
            }
            .into()
        })
    }
}

impl ImageCatalog for DevopsConfig {
    fn image(&self, name: &str) -> Result<&ImageDescriptor> {
        self.images.image(name)
    }

    fn image_names(&self) -> Vec<&str> {
        self.images.image_names()
    }
}
