//! Test monorepo builder for simplified test setup
//!
//! Collects workspaces, configuration and templates, then writes them into a
//! temporary directory in one go. The root `package.json` and
//! `pyproject.toml` list exactly the workspaces added through the builder.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{
    CONFIG_DIR, CONSTANTS_FILE, DEVOPS_DIR, IMAGES_FILE, MANIFEST_INDEX_FILE, MANIFESTS_DIR,
};

/// A builder for creating test monorepos with a fluent API
pub struct TestMonorepoBuilder {
    temp_dir: TempDir,
    node_members: Vec<String>,
    python_members: Vec<String>,
    templates: Vec<(String, Vec<String>)>,
    files: Vec<(String, String)>,
}

impl TestMonorepoBuilder {
    /// Create a new, empty builder
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp dir")?,
            node_members: Vec::new(),
            python_members: Vec::new(),
            templates: Vec::new(),
            files: Vec::new(),
        })
    }

    /// Add a Node workspace at `path` (relative to the root)
    ///
    /// `deployment` is the JSON value of the `deployment` key.
    pub fn with_node_workspace(
        mut self,
        path: &str,
        name: &str,
        dependencies: &[&str],
        deployment: Option<serde_json::Value>,
    ) -> Self {
        let dependencies: serde_json::Map<String, serde_json::Value> = dependencies
            .iter()
            .map(|dependency| ((*dependency).to_string(), serde_json::json!("workspace:*")))
            .collect();
        let mut manifest = serde_json::json!({
            "name": name,
            "version": "0.0.1",
            "dependencies": dependencies,
        });
        if let Some(deployment) = deployment {
            manifest["deployment"] = deployment;
        }

        self.node_members.push(path.to_string());
        self.files.push((format!("{path}/package.json"), manifest.to_string()));
        self
    }

    /// Add a Python workspace at `path` (relative to the root)
    ///
    /// `deployment` is the TOML body of the `[tool.devops.deployment]` table.
    pub fn with_python_workspace(
        mut self,
        path: &str,
        name: &str,
        dependencies: &[&str],
        deployment: Option<&str>,
    ) -> Self {
        let dependencies: Vec<String> =
            dependencies.iter().map(|dependency| format!("\"{dependency}\"")).collect();
        let mut manifest = format!(
            "[project]\nname = \"{name}\"\nversion = \"0.1.0\"\ndependencies = [{}]\n",
            dependencies.join(", ")
        );
        if let Some(deployment) = deployment {
            manifest.push_str(&format!("\n[tool.devops.deployment]\n{deployment}\n"));
        }

        self.python_members.push(path.to_string());
        self.files.push((format!("{path}/pyproject.toml"), manifest));
        self
    }

    /// Write `.devops/config/constants.yaml`
    pub fn with_constants(self, content: &str) -> Self {
        let path = format!("{DEVOPS_DIR}/{CONFIG_DIR}/{CONSTANTS_FILE}");
        self.with_file(&path, content)
    }

    /// Write `.devops/config/images.yaml`
    pub fn with_images(self, content: &str) -> Self {
        let path = format!("{DEVOPS_DIR}/{CONFIG_DIR}/{IMAGES_FILE}");
        self.with_file(&path, content)
    }

    /// Register template `name` with its fragments, written below
    /// `.devops/manifests`
    pub fn with_template(mut self, name: &str, fragments: &[(&str, &str)]) -> Self {
        let mut paths = Vec::new();
        for (fragment, content) in fragments {
            paths.push((*fragment).to_string());
            self.files.push((format!("{DEVOPS_DIR}/{MANIFESTS_DIR}/{fragment}"), (*content).to_string()));
        }
        self.templates.push((name.to_string(), paths));
        self
    }

    /// Add a file to be created in the monorepo
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write everything and return the monorepo
    pub fn build(self) -> Result<TestMonorepo> {
        let root = self.temp_dir.path().to_path_buf();

        if !self.node_members.is_empty() {
            let manifest = serde_json::json!({
                "name": "monorepo",
                "private": true,
                "workspaces": self.node_members,
            });
            write_file(&root, "package.json", &manifest.to_string())?;
        }

        if !self.python_members.is_empty() {
            let members: Vec<String> =
                self.python_members.iter().map(|member| format!("\"{member}\"")).collect();
            let manifest = format!(
                "[project]\nname = \"monorepo\"\nversion = \"0.0.0\"\n\n[tool.uv.workspace]\nmembers = [{}]\n",
                members.join(", ")
            );
            write_file(&root, "pyproject.toml", &manifest)?;
        }

        if !self.templates.is_empty() {
            let index = self
                .templates
                .iter()
                .map(|(name, fragments)| {
                    let items: Vec<String> =
                        fragments.iter().map(|fragment| format!("  - {fragment}\n")).collect();
                    format!("{name}:\n{}", items.concat())
                })
                .collect::<Vec<_>>()
                .concat();
            write_file(&root, &format!("{DEVOPS_DIR}/{MANIFESTS_DIR}/{MANIFEST_INDEX_FILE}"), &index)?;
        }

        for (path, content) in &self.files {
            write_file(&root, path, content)?;
        }

        Ok(TestMonorepo {
            _temp_dir: self.temp_dir,
            root,
        })
    }
}

/// A monorepo on disk, removed when dropped
pub struct TestMonorepo {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestMonorepo {
    /// Monorepo root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write (or overwrite) a file after the monorepo was built
    pub fn write(&self, path: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.root, path, content)
    }
}

fn write_file(root: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
