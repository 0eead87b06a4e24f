//! Build planning: module name to build specification.

use crate::bundler::{BuildOptions, ModuleDescriptor, Settings};
use std::path::{Path, PathBuf};

/// Suffix appended to a bundle path to name its companion source map.
pub const MAP_SUFFIX: &str = ".map";

/// Everything the bundler needs to build one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Module being built.
    pub module_name: String,
    /// Absolute path of the entry-point source file.
    pub entry_point: PathBuf,
    /// Absolute path the primary artifact is written to.
    pub output_path: PathBuf,
    /// Shared options merged with this module's override.
    pub options: BuildOptions,
}

impl BuildSpec {
    /// Path of the companion map when source maps are enabled.
    pub fn map_path(&self) -> Option<PathBuf> {
        self.options
            .sourcemap
            .then(|| companion_map_path(&self.output_path))
    }
}

/// `<output>.map` for a bundle written at `output`.
pub fn companion_map_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(MAP_SUFFIX);
    PathBuf::from(path)
}

/// Maps modules to [`BuildSpec`]s.
///
/// Planning is pure: no filesystem access, no failure. Entry points that do
/// not exist are reported by the executor when the module is built.
#[derive(Debug, Clone, Copy)]
pub struct BuildPlanner<'a> {
    settings: &'a Settings,
}

impl<'a> BuildPlanner<'a> {
    /// Creates a planner over `settings`.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Plans a single module.
    pub fn plan(&self, module: &ModuleDescriptor) -> BuildSpec {
        let name = module.name();
        let root = self.settings.project_root();

        let options = match self.settings.overrides_for(name) {
            Some(overrides) => self.settings.shared_options().merged(overrides),
            None => self.settings.shared_options().clone(),
        };

        BuildSpec {
            module_name: name.to_string(),
            entry_point: root.join(self.settings.entry_template().render(name)),
            output_path: root.join(self.settings.output_template().render(name)),
            options,
        }
    }

    /// Plans every module, preserving order.
    pub fn plan_all(&self, modules: &[ModuleDescriptor]) -> Vec<BuildSpec> {
        modules.iter().map(|module| self.plan(module)).collect()
    }
}
