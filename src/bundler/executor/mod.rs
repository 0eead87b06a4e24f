//! Concurrent bundle execution.
//!
//! The [`BundleExecutor`] fans out one build per [`BuildSpec`] and joins them
//! with fail-fast semantics: the first failing module aborts the remaining
//! in-flight builds and the whole batch reports that module's
//! [`Error::Build`]. No partial result set is ever returned, so the packager
//! never sees an incomplete module set.
//!
//! The bundler itself is abstracted behind [`BundleTool`]. The production
//! implementation is [`EsbuildBundler`]; tests substitute their own.

mod esbuild;
mod tool_detection;

pub use esbuild::EsbuildBundler;
pub use tool_detection::{esbuild_version, find_esbuild};

use crate::bundler::{BuildSpec, Error, Result};
use std::{future::Future, path::PathBuf, sync::Arc};
use tokio::{sync::Semaphore, task::JoinSet};

/// An external bundler capable of building one module.
///
/// Implementations write the primary artifact to [`BuildSpec::output_path`]
/// and, when [`BuildSpec::map_path`] is `Some`, the companion map next to it.
/// Any error is reported as that module's build diagnostic.
pub trait BundleTool: Send + Sync + 'static {
    /// Builds one module.
    fn bundle(&self, spec: &BuildSpec) -> impl Future<Output = Result<()>> + Send;
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Module that was built.
    pub module_name: String,
    /// Primary artifact on disk.
    pub output_path: PathBuf,
    /// Companion source map on disk, if one was produced.
    pub map_path: Option<PathBuf>,
}

/// Runs a [`BundleTool`] over many modules concurrently.
#[derive(Debug)]
pub struct BundleExecutor<B> {
    tool: Arc<B>,
    jobs: usize,
}

impl<B: BundleTool> BundleExecutor<B> {
    /// Creates an executor running at most `jobs` builds at once.
    pub fn new(tool: B, jobs: usize) -> Self {
        Self {
            tool: Arc::new(tool),
            jobs: jobs.max(1),
        }
    }

    /// The underlying bundler.
    pub fn tool(&self) -> &B {
        &self.tool
    }

    /// Builds every spec, returning one result per spec in completion order.
    ///
    /// # Errors
    ///
    /// The first [`Error::Build`] to complete. Builds still running at that
    /// point are aborted and their results discarded.
    pub async fn execute_all(&self, specs: Vec<BuildSpec>) -> Result<Vec<BuildResult>> {
        let limiter = Arc::new(Semaphore::new(self.jobs));
        let mut builds = JoinSet::new();
        let expected = specs.len();

        for spec in specs {
            let tool = Arc::clone(&self.tool);
            let limiter = Arc::clone(&limiter);
            builds.spawn(async move {
                let _permit = limiter.acquire_owned().await.map_err(|e| {
                    Error::GenericError(format!("build limiter closed: {e}"))
                })?;
                execute_one(tool.as_ref(), spec).await
            });
        }

        let mut results = Vec::with_capacity(expected);
        while let Some(joined) = builds.join_next().await {
            let outcome = joined.map_err(|e| {
                Error::GenericError(format!("build task panicked: {e}"))
            });
            match outcome.and_then(|result| result) {
                Ok(result) => {
                    log::info!("Built {} -> {}", result.module_name, result.output_path.display());
                    results.push(result);
                }
                Err(e) => {
                    let in_flight = builds.len();
                    if in_flight > 0 {
                        log::warn!("Aborting {in_flight} in-flight build(s) after failure");
                    }
                    builds.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(results)
    }
}

/// Builds one module and verifies its artifacts exist.
async fn execute_one<B: BundleTool>(tool: &B, spec: BuildSpec) -> Result<BuildResult> {
    let module = spec.module_name.clone();
    let build_error = |diagnostic: String| Error::Build {
        module: module.clone(),
        diagnostic,
    };

    if !tokio::fs::try_exists(&spec.entry_point).await.unwrap_or(false) {
        return Err(build_error(format!(
            "entry point {} does not exist",
            spec.entry_point.display()
        )));
    }

    if let Some(parent) = spec.output_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            build_error(format!(
                "cannot create output directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    log::debug!(
        "Bundling {} from {}",
        spec.module_name,
        spec.entry_point.display()
    );
    tool.bundle(&spec).await.map_err(|e| match e {
        Error::Build { .. } => e,
        other => build_error(other.to_string()),
    })?;

    if !tokio::fs::try_exists(&spec.output_path).await.unwrap_or(false) {
        return Err(build_error(format!(
            "bundler reported success but {} was not written",
            spec.output_path.display()
        )));
    }

    let map_path = spec.map_path();
    if let Some(map) = &map_path {
        if !tokio::fs::try_exists(map).await.unwrap_or(false) {
            return Err(build_error(format!(
                "source maps are enabled but {} was not written",
                map.display()
            )));
        }
    }

    Ok(BuildResult {
        module_name: spec.module_name,
        output_path: spec.output_path,
        map_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildOptions, planner::companion_map_path};
    use std::{
        path::Path,
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        time::{Duration, Instant},
    };

    /// Copies the entry point to the output, optionally writing a map.
    #[derive(Default)]
    struct CopyTool {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl BundleTool for CopyTool {
        async fn bundle(&self, spec: &BuildSpec) -> Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            let source = tokio::fs::read(&spec.entry_point).await?;
            tokio::fs::write(&spec.output_path, source).await?;
            if let Some(map) = spec.map_path() {
                tokio::fs::write(map, b"{\"version\":3}").await?;
            }
            Ok(())
        }
    }

    /// Reports success without writing anything.
    struct LazyTool;

    impl BundleTool for LazyTool {
        async fn bundle(&self, _spec: &BuildSpec) -> Result<()> {
            Ok(())
        }
    }

    /// Fails `bad` immediately; `slow` takes seconds and records completion.
    #[derive(Default)]
    struct FailFastTool {
        slow_finished: AtomicBool,
    }

    impl BundleTool for FailFastTool {
        async fn bundle(&self, spec: &BuildSpec) -> Result<()> {
            if spec.module_name == "bad" {
                return Err(Error::Build {
                    module: "bad".into(),
                    diagnostic: "Expected \";\" but found \"}\"".into(),
                });
            }
            tokio::time::sleep(Duration::from_secs(3)).await;
            self.slow_finished.store(true, Ordering::SeqCst);
            tokio::fs::write(&spec.output_path, b"slow").await?;
            Ok(())
        }
    }

    fn spec(root: &Path, name: &str, sourcemap: bool) -> BuildSpec {
        BuildSpec {
            module_name: name.to_string(),
            entry_point: root.join("src").join(format!("{name}.ts")),
            output_path: root.join("dist").join(format!("{name}.esm.js")),
            options: BuildOptions {
                sourcemap,
                ..Default::default()
            },
        }
    }

    fn write_entry(root: &Path, name: &str) {
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src").join(format!("{name}.ts")), name).unwrap();
    }

    #[tokio::test]
    async fn builds_every_module() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c"] {
            write_entry(dir.path(), name);
        }
        let specs = ["a", "b", "c"]
            .iter()
            .map(|n| spec(dir.path(), n, true))
            .collect();

        let executor = BundleExecutor::new(CopyTool::default(), 8);
        let mut results = executor.execute_all(specs).await.unwrap();
        results.sort_by(|a, b| a.module_name.cmp(&b.module_name));

        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.output_path.exists());
            assert_eq!(
                result.map_path.as_deref(),
                Some(companion_map_path(&result.output_path).as_path())
            );
        }
        assert_eq!(
            std::fs::read_to_string(&results[1].output_path).unwrap(),
            "b"
        );
    }

    #[tokio::test]
    async fn respects_job_limit() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["a", "b", "c", "d", "e"];
        for name in names {
            write_entry(dir.path(), name);
        }
        let specs = names.iter().map(|n| spec(dir.path(), n, false)).collect();

        let executor = BundleExecutor::new(CopyTool::default(), 2);
        let results = executor.execute_all(specs).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.map_path.is_none()));
        assert!(executor.tool().peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn missing_entry_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_entry(dir.path(), "world");
        let specs = vec![spec(dir.path(), "world", true), spec(dir.path(), "gone", true)];

        let err = BundleExecutor::new(CopyTool::default(), 4)
            .execute_all(specs)
            .await
            .unwrap_err();

        match err {
            Error::Build { module, diagnostic } => {
                assert_eq!(module, "gone");
                assert!(diagnostic.contains("does not exist"));
            }
            other => panic!("expected build error, got {other}"),
        }
    }

    #[tokio::test]
    async fn failure_aborts_in_flight_builds() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["slow", "bad"] {
            write_entry(dir.path(), name);
        }
        let specs = vec![spec(dir.path(), "slow", false), spec(dir.path(), "bad", false)];
        let executor = BundleExecutor::new(FailFastTool::default(), 2);

        let started = Instant::now();
        let err = executor.execute_all(specs).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
        assert_eq!(err.module_name(), Some("bad"));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(!executor.tool().slow_finished.load(Ordering::SeqCst));
        assert!(!dir.path().join("dist/slow.esm.js").exists());
    }

    #[tokio::test]
    async fn unwritten_artifact_is_a_build_error() {
        let dir = tempfile::tempdir().unwrap();
        write_entry(dir.path(), "world");

        let err = BundleExecutor::new(LazyTool, 1)
            .execute_all(vec![spec(dir.path(), "world", false)])
            .await
            .unwrap_err();
        assert_eq!(err.module_name(), Some("world"));
        assert_eq!(err.stage(), "build");
    }

    #[tokio::test]
    async fn empty_batch_is_ok() {
        let results = BundleExecutor::new(LazyTool, 1)
            .execute_all(Vec::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
