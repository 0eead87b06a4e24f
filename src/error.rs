//! Error types for the command line layer.
//!
//! Pipeline failures live in [`crate::bundler::Error`]; this module wraps them
//! together with argument and project-file problems.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments or project files
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Pipeline stage the error belongs to.
    ///
    /// Anything raised before the pipeline starts is a configuration error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Bundler(e) => e.stage(),
            _ => "configuration",
        }
    }

    /// Module the error is attributed to, if any.
    pub fn module_name(&self) -> Option<&str> {
        match self {
            Self::Bundler(e) => e.module_name(),
            _ => None,
        }
    }
}
