//! Generic YAML configuration parsing.
//!
//! Every file below `.devops/config` goes through [`parse_config`], which
//! reports parse failures as [`DevopsError::ManifestParseError`] naming the
//! file. A missing file is not an error: callers receive the type's default
//! and the accessors that need a value report what is missing.

use anyhow::Result;
use std::path::Path;

use crate::core::{DevopsError, FileOps};

/// Parse a YAML configuration file into `T`.
///
/// Returns `T::default()` when the file does not exist.
///
/// # Examples
///
/// ```rust,no_run
/// use devops_cli::config::parse_config;
/// use serde::Deserialize;
/// use std::path::Path;
///
/// #[derive(Default, Deserialize)]
/// struct Settings {
///     name: Option<String>,
/// }
///
/// # fn example() -> anyhow::Result<()> {
/// let settings: Settings = parse_config(Path::new(".devops/config/constants.yaml"))?;
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if !path.is_file() {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        return Ok(T::default());
    }

    let content = FileOps::read_with_context(path, "devops configuration", "config")?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    let config = serde_yaml::from_str(&content).map_err(|e| DevopsError::ManifestParseError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(config)
}
