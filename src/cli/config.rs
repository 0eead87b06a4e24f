//! Project configuration from `bundle.toml` merged with command line flags.
//!
//! Precedence is flag, then file, then built-in default.
//!
//! ```toml
//! entry = "src/{module}.ts"
//! output = "dist/{module}.esm.js"
//! archive-dir = "dist"
//! modules = ["world", "getUser", "putUser"]
//! source-maps = true
//! externalize-dependencies = false
//! backend = "zip"
//! jobs = 4
//!
//! [options]
//! target = "es2020"
//!
//! [overrides.getUser]
//! minify = false
//! ```

use super::Args;
use crate::bundler::{
    ArchiveBackend, BuildOptions, BuildOverrides, ModuleSource, PipelineVariant, Settings,
    SettingsBuilder, settings::MODULE_PLACEHOLDER,
};
use crate::error::{CliError, Result};
use crate::metadata;
use anyhow::Context as _;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default project file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "bundle.toml";

/// Contents of `bundle.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Entry point template.
    pub entry: Option<String>,
    /// Bundle output template.
    pub output: Option<String>,
    /// Archive directory, relative to the project root.
    pub archive_dir: Option<PathBuf>,
    /// Explicit module list; takes precedence over `index`.
    pub modules: Option<Vec<String>>,
    /// Index file whose exports name the modules.
    pub index: Option<PathBuf>,
    /// Emit and archive source maps.
    pub source_maps: Option<bool>,
    /// Leave package.json dependencies out of bundles.
    pub externalize_dependencies: Option<bool>,
    /// Archive writer.
    pub backend: Option<ArchiveBackend>,
    /// Maximum concurrent builds.
    pub jobs: Option<usize>,
    /// Bundler options shared by every module.
    pub options: BuildOverrides,
    /// Per-module bundler options.
    pub overrides: BTreeMap<String, BuildOverrides>,
}

impl ProjectConfig {
    /// Reads and parses a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Fully resolved inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct Project {
    /// Validated pipeline settings.
    pub settings: Settings,
    /// Where the module set comes from.
    pub source: ModuleSource,
    /// Project file that was applied, if any.
    pub config_path: Option<PathBuf>,
}

/// Loads `bundle.toml` and `package.json` for `args.root` and applies flags.
pub fn load_project(args: &Args) -> Result<Project> {
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(args.root.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };
    let config = match &config_path {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };
    if let Some(path) = &config_path {
        log::debug!("Loaded {}", path.display());
    }

    let dependencies = metadata::load_package_manifest(&args.root)?
        .map(|manifest| manifest.dependency_names())
        .unwrap_or_default();

    let settings = build_settings(args, &config, dependencies)?;
    let source = module_source(&settings, &config)?;

    Ok(Project {
        settings,
        source,
        config_path,
    })
}

/// Merges flags over `config` into validated [`Settings`].
pub fn build_settings(
    args: &Args,
    config: &ProjectConfig,
    dependencies: Vec<String>,
) -> Result<Settings> {
    let include_source_maps = !args.no_sourcemap
        && config
            .source_maps
            .or(config.options.sourcemap)
            .unwrap_or(true);
    let variant = PipelineVariant {
        include_source_maps,
        externalize_dependencies: args.externalize_dependencies
            || config.externalize_dependencies.unwrap_or(false),
        archive_backend: args.backend.or(config.backend).unwrap_or_default(),
    };

    let mut builder = SettingsBuilder::new()
        .project_root(&args.root)
        .shared_options(BuildOptions::default().merged(&config.options))
        .overrides(config.overrides.clone())
        .variant(variant)
        .dependencies(dependencies);

    if let Some(entry) = args.entry.as_ref().or(config.entry.as_ref()) {
        builder = builder.entry_template(entry.clone());
    }
    if let Some(output) = args.output.as_ref().or(config.output.as_ref()) {
        builder = builder.output_template(output.clone());
    }
    if let Some(dir) = args.archive_dir.as_ref().or(config.archive_dir.as_ref()) {
        builder = builder.archive_directory(dir);
    }
    if let Some(jobs) = args.jobs.or(config.jobs) {
        builder = builder.jobs(jobs);
    }

    Ok(builder.build()?)
}

/// Picks the module source: explicit list, then index file, then the entry
/// files next to the default index.
pub fn module_source(settings: &Settings, config: &ProjectConfig) -> Result<ModuleSource> {
    if let Some(modules) = &config.modules {
        return Ok(ModuleSource::Names(modules.clone()));
    }

    let root = settings.project_root();
    if let Some(index) = &config.index {
        return Ok(ModuleSource::Index(root.join(index)));
    }

    let pattern = settings.entry_template().pattern();
    let template = Path::new(pattern);
    let file_pattern = template
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent_pattern = template
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let Some((prefix, suffix)) = file_pattern
        .split_once(MODULE_PLACEHOLDER)
        .filter(|(_, suffix)| !suffix.contains(MODULE_PLACEHOLDER))
        .filter(|_| !parent_pattern.to_string_lossy().contains(MODULE_PLACEHOLDER))
    else {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "cannot discover modules for entry template '{pattern}'; \
                 list them with `modules = [...]` in {CONFIG_FILE_NAME}"
            ),
        }
        .into());
    };

    let default_index = root.join(settings.entry_template().render("index"));
    if default_index.is_file() {
        return Ok(ModuleSource::Index(default_index));
    }

    Ok(ModuleSource::Directory {
        directory: if parent_pattern.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(parent_pattern)
        },
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    })
}
