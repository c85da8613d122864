//! Test utilities for devops
//!
//! Helpers for writing tests against a real file system: a fluent builder
//! that lays out a throwaway monorepo in a temporary directory, and canned
//! configuration and template fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use devops_cli::test_utils::{MonorepoFixture, TestMonorepoBuilder};
//!
//! let repo = TestMonorepoBuilder::new()
//!     .unwrap()
//!     .with_node_workspace("apps/www", "www", &["utils"], None)
//!     .with_node_workspace("libs/utils", "utils", &[], None)
//!     .build()
//!     .unwrap();
//! assert!(repo.path().join("package.json").exists());
//!
//! let sample = MonorepoFixture::sample().unwrap();
//! assert!(sample.path().join(".devops/manifests/_index.yaml").exists());
//! ```

pub mod builder;
pub mod fixtures;

pub use builder::{TestMonorepo, TestMonorepoBuilder};
pub use fixtures::MonorepoFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
