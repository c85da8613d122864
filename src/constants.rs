//! Global constants used throughout the devops codebase.
//!
//! File locations, well-known names and the default environment lists live
//! here so that the discovery, configuration and generation modules agree on
//! them.

/// Environment variable pointing at the monorepo root.
pub const MONOREPO_ROOT_ENV: &str = "MONOREPO_ROOT";

/// Directory (relative to the monorepo root) holding all devops configuration.
pub const DEVOPS_DIR: &str = ".devops";

/// Configuration directory, relative to [`DEVOPS_DIR`].
pub const CONFIG_DIR: &str = "config";

/// Project-wide constants file inside [`CONFIG_DIR`].
pub const CONSTANTS_FILE: &str = "constants.yaml";

/// Image definitions file inside [`CONFIG_DIR`].
pub const IMAGES_FILE: &str = "images.yaml";

/// Template fragments directory, relative to [`DEVOPS_DIR`].
pub const MANIFESTS_DIR: &str = "manifests";

/// Template index file inside [`MANIFESTS_DIR`].
pub const MANIFEST_INDEX_FILE: &str = "_index.yaml";

/// Name of the per-workspace override folder.
pub const OVERRIDE_DIR: &str = "manifests";

/// Template rendered by the database migration job generator.
pub const DB_MIGRATE_TEMPLATE: &str = "db-migrate";

/// Key of the generated cryptographic base secret inside the env secret.
pub const BASE_SECRET_KEY: &str = "baseSecret";

/// Placeholder rendered in place of a domain name when the image has no
/// domain mapping for the environment.
///
/// Must stay a plain YAML scalar so it survives parsing and merging verbatim.
pub const MISSING_DOMAIN_SENTINEL: &str = "MISSING_DOMAIN_NAME_FOR_IMAGE_AND_ENV";

/// Environments that can be deployed to unless extended by configuration.
pub const DEFAULT_REMOTE_ENVS: &[&str] = &["staging", "production"];

/// Paths that never contain workspaces of their own.
pub const IGNORED_PATHS: &[&str] = &["node_modules/", "venv/"];

/// Exit code reported when a workspace cannot be found.
///
/// CI automation relies on this value to tell "not found" apart from other
/// failures.
pub const WORKSPACE_NOT_FOUND_EXIT_CODE: i32 = 13;

/// Number of git SHA characters kept in job names.
pub const SHORT_SHA_LEN: usize = 8;

/// Default replica count when neither the scale map nor the descriptor sets one.
pub const DEFAULT_REPLICAS: u32 = 1;
