//! Builder for constructing Settings.

use super::{BuildOptions, BuildOverrides, PathTemplate, PipelineVariant, Settings};
use crate::bundler::{Error, Result};
use path_absolutize::Absolutize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Default entry-point template.
pub const DEFAULT_ENTRY_TEMPLATE: &str = "src/{module}.ts";

/// Default bundle output template.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "dist/{module}.esm.js";

/// Default archive directory, relative to the project root.
pub const DEFAULT_ARCHIVE_DIRECTORY: &str = "dist";

/// Builder for constructing [`Settings`].
///
/// Provides a fluent API for building pipeline settings with validation.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_lambda::bundler::{ArchiveBackend, PipelineVariant, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_lambda::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root("services/api")
///     .variant(PipelineVariant {
///         include_source_maps: false,
///         externalize_dependencies: true,
///         archive_backend: ArchiveBackend::AsyncZip,
///     })
///     .dependencies(vec!["@aws-sdk/client-dynamodb".into()])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    project_root: Option<PathBuf>,
    entry_template: Option<String>,
    output_template: Option<String>,
    archive_directory: Option<PathBuf>,
    shared_options: BuildOptions,
    overrides: BTreeMap<String, BuildOverrides>,
    variant: PipelineVariant,
    dependencies: Vec<String>,
    jobs: Option<usize>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root.
    ///
    /// Default: current directory
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the entry-point template.
    ///
    /// Default: `src/{module}.ts`
    pub fn entry_template(mut self, pattern: impl Into<String>) -> Self {
        self.entry_template = Some(pattern.into());
        self
    }

    /// Sets the bundle output template.
    ///
    /// Default: `dist/{module}.esm.js`
    pub fn output_template(mut self, pattern: impl Into<String>) -> Self {
        self.output_template = Some(pattern.into());
        self
    }

    /// Sets the directory archives are written to. Relative paths resolve
    /// against the project root.
    ///
    /// Default: `dist`
    pub fn archive_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets options shared by every module.
    ///
    /// `sourcemap` is taken from the variant at build time.
    pub fn shared_options(mut self, options: BuildOptions) -> Self {
        self.shared_options = options;
        self
    }

    /// Adds an override for one module. Later calls for the same module replace
    /// earlier ones.
    pub fn module_override(mut self, module_name: impl Into<String>, overrides: BuildOverrides) -> Self {
        self.overrides.insert(module_name.into(), overrides);
        self
    }

    /// Replaces all per-module overrides.
    pub fn overrides(mut self, overrides: BTreeMap<String, BuildOverrides>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets the pipeline variant.
    pub fn variant(mut self, variant: PipelineVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets declared runtime dependencies. They become bundler externals when
    /// the variant externalizes dependencies.
    pub fn dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Sets the build concurrency limit.
    ///
    /// Default: number of logical CPUs
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a template lacks the `{module}`
    /// placeholder, the project root cannot be resolved, or `jobs` is zero.
    pub fn build(self) -> Result<Settings> {
        let root = self.project_root.unwrap_or_else(|| PathBuf::from("."));
        let project_root = root
            .absolutize()
            .map_err(|e| {
                Error::Configuration(format!(
                    "cannot resolve project root {}: {e}",
                    root.display()
                ))
            })?
            .into_owned();

        let entry_template = PathTemplate::new(
            self.entry_template
                .unwrap_or_else(|| DEFAULT_ENTRY_TEMPLATE.to_string()),
        )?;
        let output_template = PathTemplate::new(
            self.output_template
                .unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string()),
        )?;

        let archive_directory = project_root.join(
            self.archive_directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_DIRECTORY)),
        );

        let jobs = self.jobs.unwrap_or_else(num_cpus::get);
        if jobs == 0 {
            return Err(Error::Configuration("jobs must be at least 1".into()));
        }

        let mut shared_options = self.shared_options;
        shared_options.sourcemap = self.variant.include_source_maps;
        if self.variant.externalize_dependencies {
            shared_options.external.extend(self.dependencies);
        }
        shared_options.external.sort();
        shared_options.external.dedup();

        Ok(Settings::new(
            project_root,
            entry_template,
            output_template,
            archive_directory,
            shared_options,
            self.overrides,
            self.variant,
            jobs,
        ))
    }
}
