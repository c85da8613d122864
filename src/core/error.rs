//! Error handling for devops
//!
//! This module provides the error types and user-friendly error reporting for
//! the devops tool. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers (and tests) can match on the failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`DevopsError`] - Enumerated error types for every failure of the core
//! - [`ErrorKind`] - Coarse classification used by callers deciding what to do
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Library functions return [`anyhow::Result`] whose root cause is usually a
//! [`DevopsError`]; file paths and other context are layered on with
//! [`anyhow::Context`]. Only the binary decides how an error ends the process.
//!
//! # Examples
//!
//! ```rust,no_run
//! use devops_cli::core::{DevopsError, ErrorKind, user_friendly_error};
//!
//! let error = anyhow::Error::from(DevopsError::WorkspaceNotFound {
//!     name: "@local/web".to_string(),
//!     suggestions: vec![],
//! });
//! assert_eq!(DevopsError::kind_of(&error), Some(ErrorKind::NotFound));
//!
//! let ctx = user_friendly_error(error);
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::file_error::FileOperationError;
use crate::constants::WORKSPACE_NOT_FOUND_EXIT_CODE;

/// Coarse classification of a [`DevopsError`].
///
/// None of these are transient: every kind describes a static configuration
/// defect that has to be fixed before the request can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A named workspace, template, image or file does not exist.
    NotFound,
    /// Configuration exists but lacks something a request needs.
    ConfigurationIncomplete,
    /// A template fragment rendered into something that is not a valid manifest.
    MalformedTemplate,
    /// A configuration or workspace manifest file could not be read or parsed.
    Configuration,
}

/// The main error type for devops operations.
///
/// # Error Categories
///
/// ## Not found
/// - [`WorkspaceNotFound`](Self::WorkspaceNotFound), [`TemplateNotFound`](Self::TemplateNotFound),
///   [`ImageNotFound`](Self::ImageNotFound), [`FragmentNotFound`](Self::FragmentNotFound)
///
/// ## Configuration incomplete
/// - [`DeploymentMissing`](Self::DeploymentMissing), [`DomainMissing`](Self::DomainMissing),
///   [`EmptyTemplate`](Self::EmptyTemplate), [`UnsupportedEnvironment`](Self::UnsupportedEnvironment),
///   [`MissingConstant`](Self::MissingConstant)
///
/// ## Malformed template
/// - [`MalformedTemplate`](Self::MalformedTemplate)
///
/// ## Configuration files
/// - [`ManifestParseError`](Self::ManifestParseError), [`ConflictingRootPaths`](Self::ConflictingRootPaths),
///   [`ConfigError`](Self::ConfigError)
#[derive(Error, Debug, Clone)]
pub enum DevopsError {
    /// A workspace name is not known to the monorepo
    #[error("Workspace {name} not found")]
    WorkspaceNotFound {
        /// The requested workspace name
        name: String,
        /// Known workspace names close to the requested one
        suggestions: Vec<String>,
    },

    /// A template name is absent from the template index
    #[error("No entries found for template '{name}' in {}", .index.display())]
    TemplateNotFound {
        /// The requested template name
        name: String,
        /// Path of the template index file
        index: PathBuf,
        /// Known template names close to the requested one
        suggestions: Vec<String>,
    },

    /// A template index entry lists no fragments
    #[error("Template '{name}' has no fragment files in {}", .index.display())]
    EmptyTemplate {
        /// Template name
        name: String,
        /// Path of the template index file
        index: PathBuf,
    },

    /// An image name is absent from images.yaml
    #[error("Image {name} not found in images.yaml")]
    ImageNotFound {
        /// The requested image name
        name: String,
        /// Known image names close to the requested one
        suggestions: Vec<String>,
    },

    /// A fragment listed in the template index does not exist on disk
    #[error("Manifest fragment {} listed for template '{template}' does not exist", .path.display())]
    FragmentNotFound {
        /// Template that references the fragment
        template: String,
        /// Absolute path of the missing fragment
        path: PathBuf,
    },

    /// A workspace is deployed but declares no deployment descriptor
    #[error("The deployment key is missing for workspace {workspace}")]
    DeploymentMissing {
        /// Workspace name
        workspace: String,
    },

    /// The image has no domain configured for the environment
    #[error("The image {image} does not have a domain defined for the environment {env}")]
    DomainMissing {
        /// Image name
        image: String,
        /// Environment name
        env: String,
    },

    /// The environment cannot be deployed to
    #[error("MONOREPO_ENV must be one of: {}. Received: '{env}'", .supported.join(", "))]
    UnsupportedEnvironment {
        /// The requested environment
        env: String,
        /// Environments that are accepted
        supported: Vec<String>,
    },

    /// A required entry of constants.yaml is missing
    #[error("Missing constant in {}: {key}", .file.display())]
    MissingConstant {
        /// The constant key
        key: String,
        /// The constants file
        file: PathBuf,
    },

    /// A rendered fragment is not a valid manifest document
    #[error("Invalid manifest file {}: {reason}", .path.display())]
    MalformedTemplate {
        /// Fragment that produced the document
        path: PathBuf,
        /// What is wrong with it
        reason: String,
        /// The offending (rendered) document text
        document: String,
    },

    /// A workspace manifest or configuration file failed to parse
    #[error("Error parsing {}: {reason}", .file.display())]
    ManifestParseError {
        /// The file that failed to parse
        file: PathBuf,
        /// Parser message
        reason: String,
    },

    /// The same workspace name was discovered at two different locations
    #[error("Workspace {name} has conflicting root paths:\n\t{}\n\t{}", .first.display(), .second.display())]
    ConflictingRootPaths {
        /// Workspace name
        name: String,
        /// Root path found first
        first: PathBuf,
        /// Root path found second
        second: PathBuf,
    },

    /// Any other configuration problem
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl DevopsError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::WorkspaceNotFound { .. }
            | Self::TemplateNotFound { .. }
            | Self::ImageNotFound { .. }
            | Self::FragmentNotFound { .. } => ErrorKind::NotFound,
            Self::DeploymentMissing { .. }
            | Self::DomainMissing { .. }
            | Self::EmptyTemplate { .. }
            | Self::UnsupportedEnvironment { .. }
            | Self::MissingConstant { .. } => ErrorKind::ConfigurationIncomplete,
            Self::MalformedTemplate { .. } => ErrorKind::MalformedTemplate,
            Self::ManifestParseError { .. }
            | Self::ConflictingRootPaths { .. }
            | Self::ConfigError { .. }
            | Self::Other { .. } => ErrorKind::Configuration,
        }
    }

    /// Find the first [`DevopsError`] in an error chain and classify it.
    #[must_use]
    pub fn kind_of(error: &anyhow::Error) -> Option<ErrorKind> {
        error.chain().find_map(|cause| cause.downcast_ref::<Self>()).map(Self::kind)
    }

    /// Process exit code the CLI reports for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::WorkspaceNotFound { .. } => WORKSPACE_NOT_FOUND_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Return up to three `candidates` close to `target`, closest first.
///
/// Used to build "did you mean" hints for not-found errors.
pub fn similar_names<'a, I>(target: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = (target.len() / 2).max(2);
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    scored.sort();
    scored.into_iter().take(3).map(|(_, name)| name.to_string()).collect()
}

/// Error wrapper with user-friendly details and suggestions.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying devops error
    pub error: DevopsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DevopsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// The first [`DevopsError`] found in the chain determines the message and
/// suggestion; context added along the way (file paths, template names) is
/// kept in the details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain: Vec<String> = error.chain().map(ToString::to_string).collect();

    if let Some(devops_error) = error.chain().find_map(|cause| cause.downcast_ref::<DevopsError>())
    {
        let mut ctx = create_error_context(devops_error.clone());
        let outer: Vec<&String> =
            chain.iter().take_while(|line| **line != devops_error.to_string()).collect();
        if !outer.is_empty() {
            let context_lines =
                outer.iter().map(|line| format!("  {line}")).collect::<Vec<_>>().join("\n");
            ctx.details = Some(match ctx.details.take() {
                Some(details) => format!("{details}\nWhile:\n{context_lines}"),
                None => format!("While:\n{context_lines}"),
            });
        }
        return ctx;
    }

    if let Some(file_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<FileOperationError>())
    {
        return ErrorContext::new(DevopsError::Other {
            message: file_error.to_string(),
        })
        .with_details(file_error.user_message());
    }

    if let Some(io_error) = error.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>())
    {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(DevopsError::Other {
                message: chain.join(": "),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct")
            .with_details("Use --root or MONOREPO_ROOT to point at the monorepo root directory");
        }
    }

    ErrorContext::new(DevopsError::Other {
        message: chain.join("\n  caused by: "),
    })
}

/// Map each [`DevopsError`] variant to tailored suggestions and details.
fn create_error_context(error: DevopsError) -> ErrorContext {
    match &error {
        DevopsError::WorkspaceNotFound { suggestions, .. } => {
            let ctx = ErrorContext::new(error.clone())
                .with_details("Workspaces are discovered from the root package.json workspaces and pyproject.toml uv members");
            if suggestions.is_empty() {
                ctx.with_suggestion("Check the workspace name in its package.json or pyproject.toml")
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        DevopsError::TemplateNotFound { suggestions, .. } => {
            let ctx = ErrorContext::new(error.clone())
                .with_details("Template names map to fragment files in .devops/manifests/_index.yaml");
            if suggestions.is_empty() {
                ctx.with_suggestion("Add the template to .devops/manifests/_index.yaml")
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        DevopsError::ImageNotFound { suggestions, .. } => {
            let ctx = ErrorContext::new(error.clone());
            if suggestions.is_empty() {
                ctx.with_suggestion("Add the image under `images:` in .devops/config/images.yaml")
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        DevopsError::EmptyTemplate { .. } => ErrorContext::new(error.clone())
            .with_suggestion("List at least one fragment file for the template in .devops/manifests/_index.yaml"),
        DevopsError::FragmentNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Fragment paths in _index.yaml are relative to .devops/manifests"),
        DevopsError::DeploymentMissing { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Add a `deployment` key (with at least `template`) to the workspace manifest"),
        DevopsError::DomainMissing { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Please add it to the image `domains` in .devops/config/images.yaml"),
        DevopsError::UnsupportedEnvironment { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Pass a supported environment with --env, or list it under extra-remote-environments in constants.yaml"),
        DevopsError::MissingConstant { key, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Add `{key}` to .devops/config/constants.yaml")),
        DevopsError::MalformedTemplate { document, .. } => ErrorContext::new(error.clone())
            .with_details(format!("Offending document:\n{document}"))
            .with_suggestion("Every manifest document must define `kind` and `metadata.name`"),
        DevopsError::ManifestParseError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the file syntax; JSON, TOML and YAML parsers report the position of the problem"),
        DevopsError::ConflictingRootPaths { .. } => ErrorContext::new(error.clone())
            .with_suggestion("A workspace name must be unique across the monorepo; rename one of the packages"),
        DevopsError::ConfigError { .. } | DevopsError::Other { .. } => ErrorContext::new(error),
    }
}
