//! Command line interface for kodegen bundler.
//!
//! This module provides the CLI for pipeline runs, with argument parsing,
//! project configuration, and user feedback.

mod args;
pub mod config;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::{EsbuildBundler, Error, ModuleRegistry, PackagedArchive, Pipeline};
use crate::error::{BundlerError, Result};
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let runtime = RuntimeConfig::from(&args);

    if let Err(reason) = args.validate() {
        runtime.error(&reason)?;
        return Ok(1);
    }

    match execute(&args, &runtime).await {
        Ok(code) => Ok(code),
        Err(e) => {
            report_failure(&runtime, &e)?;
            Ok(1)
        }
    }
}

/// Resolves the project and runs the pipeline.
pub async fn execute(args: &Args, runtime: &RuntimeConfig) -> Result<i32> {
    let project = config::load_project(args)?;
    if let Some(path) = &project.config_path {
        runtime.verbose_println(&format!("Using {}", path.display()))?;
    }

    let registry = ModuleRegistry::load(&project.source).await?;

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(0);
    }

    if registry.is_empty() {
        runtime.warn("No modules registered; nothing to build")?;
        return Ok(0);
    }

    let settings = project.settings;
    let esbuild = match &args.esbuild {
        Some(program) => {
            EsbuildBundler::new(program, settings.project_root())
                .verified()
                .await?
        }
        None => EsbuildBundler::locate(settings.project_root()).await?,
    };
    runtime.verbose_println(&format!("Using esbuild at {}", esbuild.program().display()))?;

    runtime.section(&format!("Bundling {} module(s)", registry.len()))?;
    for name in registry.names() {
        runtime.progress(name)?;
    }

    let root = settings.project_root().to_path_buf();
    let archives = Pipeline::new(settings, registry, esbuild).run().await?;

    runtime.section("Archives")?;
    for archive in &archives {
        report_archive(runtime, &root, archive)?;
    }
    runtime.success(&format!("Packaged {} module(s)", archives.len()))?;

    Ok(0)
}

fn report_archive(runtime: &RuntimeConfig, root: &Path, archive: &PackagedArchive) -> Result<()> {
    runtime.success(&format!(
        "{} ({} bytes)",
        display_path(root, &archive.path),
        archive.size
    ))?;
    runtime.verbose_println(&format!("    entries: {}", archive.entries.join(", ")))?;
    runtime.verbose_println(&format!("    sha256:  {}", archive.checksum))?;
    Ok(())
}

fn report_failure(runtime: &RuntimeConfig, error: &BundlerError) -> Result<()> {
    let output = runtime.output();

    if let BundlerError::Bundler(Error::PackagingFailed { failures, packaged }) = error {
        output.error(&format!(
            "packaging failed for {} module(s)",
            failures.len()
        ))?;
        for failure in failures {
            output.error_detail(&failure.to_string())?;
        }
        if !packaged.is_empty() {
            output.error_detail("archives written before the failure:")?;
            for path in packaged {
                output.error_detail(&format!("  {}", path.display()))?;
            }
        }
        return Ok(());
    }

    let message = match error.module_name() {
        Some(module) => format!("{} stage failed for module `{module}`", error.stage()),
        None => format!("{} stage failed", error.stage()),
    };
    output.error(&message)?;
    for line in error.to_string().lines() {
        output.error_detail(line)?;
    }
    Ok(())
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
