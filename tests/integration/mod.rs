//! Integration test suite for devops
//!
//! End-to-end tests over monorepos written to temporary directories with
//! `devops_cli::test_utils`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **discovery**: Workspace discovery, graphs and image build contexts
//! - **generate**: Manifest generation through the library API
//! - **cli**: The `devops` binary, output and exit codes

mod cli;
mod discovery;
mod generate;
