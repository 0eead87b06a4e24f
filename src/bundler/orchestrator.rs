//! Main pipeline orchestration and coordination.
//!
//! This module provides the [`Pipeline`] that sequences the registry, planner,
//! executor and packager over the full module set.

use crate::{
    bail,
    bundler::{
        BuildPlanner, BuildResult, BundleExecutor, BundleTool, Error, ModuleRegistry,
        PackagedArchive, Packager, Result, Settings, error::ModuleFailure,
    },
};

/// Main pipeline orchestrator.
///
/// Runs Plan → Execute → Package for every registered module:
///
/// 1. Plans one [`BuildSpec`] per module (pure, cannot fail)
/// 2. Builds all modules concurrently; the first build failure aborts the run
///    before any archive is written
/// 3. Packages every built module concurrently; packaging failures are
///    collected and reported together
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_lambda::bundler::{
///     EsbuildBundler, ModuleRegistry, Pipeline, SettingsBuilder,
/// };
///
/// # async fn example() -> kodegen_bundler_lambda::bundler::Result<()> {
/// let settings = SettingsBuilder::new().project_root(".").build()?;
/// let registry = ModuleRegistry::from_names(["world", "getUser", "putUser"])?;
/// let esbuild = EsbuildBundler::locate(settings.project_root()).await?;
///
/// let archives = Pipeline::new(settings, registry, esbuild).run().await?;
/// for archive in archives {
///     println!("{} ({} bytes)", archive.path.display(), archive.size);
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`BuildSpec`]: crate::bundler::BuildSpec
#[derive(Debug)]
pub struct Pipeline<B> {
    settings: Settings,
    registry: ModuleRegistry,
    executor: BundleExecutor<B>,
    packager: Packager,
}

impl<B: BundleTool> Pipeline<B> {
    /// Creates a pipeline over `registry` using `tool` as the bundler.
    pub fn new(settings: Settings, registry: ModuleRegistry, tool: B) -> Self {
        let executor = BundleExecutor::new(tool, settings.jobs());
        let packager = Packager::from_settings(&settings);
        Self {
            settings,
            registry,
            executor,
            packager,
        }
    }

    /// Returns a reference to the pipeline settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the module registry this pipeline runs over.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Runs the full pipeline.
    ///
    /// # Returns
    ///
    /// One [`PackagedArchive`] per registered module, sorted by module name.
    /// An empty registry yields an empty vector.
    ///
    /// # Errors
    ///
    /// - [`Error::Build`] for the first module whose build failed; no archive
    ///   is written for any module
    /// - [`Error::PackagingFailed`] listing every module that failed to
    ///   package, along with the archives that were written
    pub async fn run(&self) -> Result<Vec<PackagedArchive>> {
        let modules = self.registry.list_modules();
        if modules.is_empty() {
            log::info!("No modules registered; nothing to build");
            return Ok(Vec::new());
        }

        let specs = BuildPlanner::new(&self.settings).plan_all(modules);
        log::info!("Building {} module(s)", specs.len());

        let results = self.executor.execute_all(specs).await?;
        if results.len() != modules.len() {
            bail!(
                "expected {} build result(s), got {}",
                modules.len(),
                results.len()
            );
        }

        self.package_all(results).await
    }

    /// Packages every result concurrently and reports all failures together.
    async fn package_all(&self, results: Vec<BuildResult>) -> Result<Vec<PackagedArchive>> {
        let tasks: Vec<_> = results
            .into_iter()
            .map(|result| {
                let packager = self.packager.clone();
                let module_name = result.module_name.clone();
                let task = tokio::spawn(async move { packager.package(&result).await });
                (module_name, task)
            })
            .collect();

        let mut packaged = Vec::new();
        let mut failures = Vec::new();
        for (module_name, task) in tasks {
            let outcome = task.await.map_err(|e| {
                Error::GenericError(format!("packaging task panicked: {e}"))
            });
            match outcome.and_then(|result| result) {
                Ok(archive) => packaged.push(archive),
                Err(error) => {
                    log::error!("Packaging {} failed: {}", module_name, error);
                    failures.push(ModuleFailure { module_name, error });
                }
            }
        }

        packaged.sort_by(|a, b| a.module_name.cmp(&b.module_name));
        if failures.is_empty() {
            return Ok(packaged);
        }

        failures.sort_by(|a, b| a.module_name.cmp(&b.module_name));
        Err(Error::PackagingFailed {
            failures,
            packaged: packaged.into_iter().map(|archive| archive.path).collect(),
        })
    }
}
