//! Core Settings struct and implementations.

use super::{ArchiveBackend, BuildOptions, BuildOverrides, PathTemplate, PipelineVariant};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Main settings for a pipeline run.
///
/// Central configuration for the pipeline, constructed via [`SettingsBuilder`].
/// Settings are immutable once built and are passed explicitly to each stage.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_lambda::bundler::SettingsBuilder;
///
/// # fn example() -> kodegen_bundler_lambda::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root(".")
///     .entry_template("src/{module}.ts")
///     .output_template("dist/{module}.esm.js")
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`SettingsBuilder`] - Builder for constructing Settings
/// - [`BuildOptions`] - Options handed to the bundler
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    /// Absolute project root. Templates and the archive directory resolve against it.
    project_root: PathBuf,

    /// Entry-point template, e.g. `src/{module}.ts`.
    entry_template: PathTemplate,

    /// Bundle output template, e.g. `dist/{module}.esm.js`.
    output_template: PathTemplate,

    /// Absolute directory receiving `<module>.zip` archives.
    archive_directory: PathBuf,

    /// Options shared by every module.
    shared_options: BuildOptions,

    /// Per-module overrides, keyed by module name.
    overrides: BTreeMap<String, BuildOverrides>,

    /// Pipeline flavour.
    variant: PipelineVariant,

    /// Maximum number of concurrent bundler invocations.
    jobs: usize,
}

impl Settings {
    /// Returns the absolute project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the entry-point template.
    pub fn entry_template(&self) -> &PathTemplate {
        &self.entry_template
    }

    /// Returns the bundle output template.
    pub fn output_template(&self) -> &PathTemplate {
        &self.output_template
    }

    /// Returns the directory archives are written to.
    pub fn archive_directory(&self) -> &Path {
        &self.archive_directory
    }

    /// Returns the options shared by every module.
    pub fn shared_options(&self) -> &BuildOptions {
        &self.shared_options
    }

    /// Returns the override for `module_name`, if one was configured.
    pub fn overrides_for(&self, module_name: &str) -> Option<&BuildOverrides> {
        self.overrides.get(module_name)
    }

    /// Returns all configured overrides.
    pub fn overrides(&self) -> &BTreeMap<String, BuildOverrides> {
        &self.overrides
    }

    /// Returns the pipeline variant.
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// Returns the archive backend.
    pub fn archive_backend(&self) -> ArchiveBackend {
        self.variant.archive_backend
    }

    /// Returns the build concurrency limit.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        project_root: PathBuf,
        entry_template: PathTemplate,
        output_template: PathTemplate,
        archive_directory: PathBuf,
        shared_options: BuildOptions,
        overrides: BTreeMap<String, BuildOverrides>,
        variant: PipelineVariant,
        jobs: usize,
    ) -> Self {
        Self {
            project_root,
            entry_template,
            output_template,
            archive_directory,
            shared_options,
            overrides,
            variant,
            jobs,
        }
    }
}
