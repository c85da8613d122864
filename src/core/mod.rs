//! Core types and functionality for devops
//!
//! This module holds the error taxonomy shared by every other module and the
//! file operation helpers that attach path context to I/O failures.
//!
//! # Modules
//!
//! - `error` - [`DevopsError`], its [`ErrorKind`] classification and the
//!   user-friendly [`ErrorContext`] used by the CLI
//! - `file_error` - [`FileOps`] and [`FileResultExt`] for reads that report
//!   which file failed and why it was being read
//!
//! # Error Handling Pattern
//!
//! ```rust,no_run
//! use devops_cli::core::{DevopsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(DevopsError::ImageNotFound { name: "api".into(), suggestions: vec![] }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     friendly.display();
//! }
//! ```

pub mod error;
pub mod file_error;

pub use error::{DevopsError, ErrorContext, ErrorKind, similar_names, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileOps, FileResultExt};
