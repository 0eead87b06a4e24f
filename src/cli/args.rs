//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Every flag is
//! optional; unset flags fall back to `bundle.toml` and then to the built-in
//! defaults.

use crate::bundler::ArchiveBackend;
use clap::Parser;
use std::path::PathBuf;

/// Bundles and zips deployable handler modules
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kodegen_bundler_lambda",
    version,
    about = "Bundles every handler module with esbuild and zips each bundle for deployment",
    long_about = "Bundles every handler module with esbuild and zips each bundle for deployment.

Modules come from the `modules` list in bundle.toml, the exports of src/index.ts,
or the entry files found next to it. Each module <name> is built from
src/<name>.ts to dist/<name>.esm.js and packaged as dist/<name>.zip containing
<name>.js and <name>.js.map.

Usage:
  kodegen_bundler_lambda
  kodegen_bundler_lambda --root ./service --no-sourcemap
  kodegen_bundler_lambda --externalize-dependencies --backend async-zip
  kodegen_bundler_lambda --list

Exit code 0 = every module has a complete archive."
)]
pub struct Args {
    /// Project root containing package.json and the module sources
    #[arg(short = 'r', long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/bundle.toml when present)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Entry point template, relative to the root; must contain {module}
    #[arg(long, value_name = "TEMPLATE")]
    pub entry: Option<String>,

    /// Bundle output template, relative to the root; must contain {module}
    #[arg(long, value_name = "TEMPLATE")]
    pub output: Option<String>,

    /// Directory receiving <module>.zip, relative to the root
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Build without source maps; archives then hold only <module>.js
    #[arg(long)]
    pub no_sourcemap: bool,

    /// Leave package.json dependencies out of the bundles
    #[arg(long)]
    pub externalize_dependencies: bool,

    /// Archive writer
    #[arg(long, value_enum, value_name = "BACKEND")]
    pub backend: Option<ArchiveBackend>,

    /// esbuild executable (default: node_modules/.bin/esbuild, then PATH)
    #[arg(long, value_name = "PATH", env = "KODEGEN_ESBUILD")]
    pub esbuild: Option<PathBuf>,

    /// Maximum number of concurrent esbuild processes
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the registered module names and exit
    #[arg(long)]
    pub list: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print per-module details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("Root cannot be empty".to_string());
        }

        if self.jobs == Some(0) {
            return Err("--jobs must be at least 1".to_string());
        }

        for (flag, template) in [("--entry", &self.entry), ("--output", &self.output)] {
            if let Some(template) = template
                && !template.contains(crate::bundler::settings::MODULE_PLACEHOLDER)
            {
                return Err(format!(
                    "{flag} template '{template}' must contain {}",
                    crate::bundler::settings::MODULE_PLACEHOLDER
                ));
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
