//! devops CLI entry point
//!
//! Parses the command line, installs the log subscriber, runs the command
//! and turns failures into a user-friendly message and exit status.
//!
//! - `workspace` - Query workspaces and their dependencies
//! - `image` - Query image build contexts
//! - `generate` - Generate Kubernetes manifests
//! - `template` - Inspect template contexts

use clap::Parser;
use devops_cli::cli;
use devops_cli::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        // Convert to user-friendly error with context and suggestions
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(error_ctx.exit_code());
    }
}
