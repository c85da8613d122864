//! Final checks on generated manifests.

use anyhow::Result;

use crate::constants::MISSING_DOMAIN_SENTINEL;
use crate::core::DevopsError;

/// Return `manifest` unless it still carries the missing-domain sentinel.
pub fn ensure_complete(manifest: String, env: &str, image: &str) -> Result<String> {
    if manifest.contains(MISSING_DOMAIN_SENTINEL) {
        return Err(DevopsError::DomainMissing {
            image: image.to_string(),
            env: env.to_string(),
        }
        .into());
    }
    Ok(manifest)
}
