//! Error types for the bundling pipeline.
//!
//! Every stage of the pipeline reports failures through [`Error`]. The three
//! pipeline-level categories are:
//!
//! - [`Error::Configuration`] - the module set or path mapping cannot be resolved;
//!   raised before any build starts
//! - [`Error::Build`] - the external bundler failed for one module
//! - [`Error::Packaging`] / [`Error::PackagingFailed`] - archive creation failed for
//!   one or more modules
//!
//! The remaining variants carry lower-level causes and are usually wrapped by
//! one of the above before they leave the pipeline.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single module that failed to package.
#[derive(Debug)]
pub struct ModuleFailure {
    /// Name of the module whose archive could not be produced.
    pub module_name: String,
    /// Underlying cause.
    pub error: Error,
}

impl Display for ModuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.module_name, self.error)
    }
}

fn summarize(failures: &[ModuleFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors produced by the bundling pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Module set or path mapping cannot be resolved.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external bundler failed for a module.
    #[error("build failed for module `{module}`: {diagnostic}")]
    Build {
        /// Failing module.
        module: String,
        /// Diagnostic reported by the bundler.
        diagnostic: String,
    },

    /// Archive creation failed for a module.
    #[error("packaging failed for module `{module}`: {source}")]
    Packaging {
        /// Failing module.
        module: String,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// One or more modules failed to package while others succeeded.
    #[error(
        "packaging failed for {} module(s) ({} archive(s) written): {}",
        .failures.len(),
        .packaged.len(),
        summarize(.failures)
    )]
    PackagingFailed {
        /// Every module that failed.
        failures: Vec<ModuleFailure>,
        /// Archives that were finalized successfully in the same run.
        packaged: Vec<PathBuf>,
    },

    /// Error with additional context.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// Filesystem error tied to a path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// A child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command name.
        command: String,
        /// Underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// I/O error.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Error from the blocking `zip` writer.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// Error from the async ZIP writer.
    #[error(transparent)]
    AsyncZip(#[from] async_zip::error::ZipError),

    /// JSON parsing error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid regular expression.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Directory traversal error.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Generic error.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Name of the module this error is attributed to, if any.
    pub fn module_name(&self) -> Option<&str> {
        match self {
            Self::Build { module, .. } | Self::Packaging { module, .. } => Some(module),
            Self::Context(_, inner) => inner.module_name(),
            _ => None,
        }
    }

    /// Pipeline stage that produced this error, for user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Build { .. } => "build",
            Self::Packaging { .. } | Self::PackagingFailed { .. } => "packaging",
            Self::Context(_, inner) => inner.stage(),
            _ => "pipeline",
        }
    }
}

/// Convenient methods for attaching filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error in [`Error::Fs`] with the given context and path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Attach a human readable context to a failure.
pub trait Context<T> {
    /// Adds context to the error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Adds lazily evaluated context to the error.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Into<Error>> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e.into())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Shorthand for a missing-path error used by the executor and packager.
pub(crate) fn not_found(context: &'static str, path: &Path) -> Error {
    Error::Fs {
        context,
        path: path.to_path_buf(),
        error: io::Error::new(io::ErrorKind::NotFound, "no such file"),
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
