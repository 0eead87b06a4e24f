//! esbuild adapter.
//!
//! Translates a [`BuildSpec`] into an esbuild command line and runs it as a
//! child process. esbuild's stderr is the build diagnostic on failure and is
//! logged at debug level on success.

use super::{BundleTool, tool_detection};
use crate::bundler::{BuildSpec, Error, Result};
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

/// Runs the esbuild CLI.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: PathBuf,
    working_directory: PathBuf,
}

impl EsbuildBundler {
    /// Uses the esbuild executable at `program`, run from `working_directory`.
    pub fn new(program: impl Into<PathBuf>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_directory: working_directory.into(),
        }
    }

    /// Locates esbuild for `project_root` and checks that it runs.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if no runnable esbuild is found.
    pub async fn locate(project_root: &Path) -> Result<Self> {
        let program = tool_detection::find_esbuild(project_root).ok_or_else(|| {
            Error::Configuration(
                "esbuild not found. Install it with `npm install --save-dev esbuild` \
                 or pass --esbuild <PATH>"
                    .into(),
            )
        })?;
        Self::new(program, project_root).verified().await
    }

    /// Checks that the configured executable runs.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if `esbuild --version` fails.
    pub async fn verified(self) -> Result<Self> {
        match tool_detection::esbuild_version(&self.program).await {
            Some(_) => Ok(self),
            None => Err(Error::Configuration(format!(
                "esbuild at {} is not runnable",
                self.program.display()
            ))),
        }
    }

    /// Path of the esbuild executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for `spec`.
    pub fn args(spec: &BuildSpec) -> Vec<String> {
        let options = &spec.options;
        let mut args = vec![spec.entry_point.display().to_string()];

        if options.bundle {
            args.push("--bundle".to_string());
        }
        if options.minify {
            args.push("--minify".to_string());
        }
        if options.sourcemap {
            args.push("--sourcemap".to_string());
        }
        args.push(format!("--platform={}", options.platform));
        args.push(format!("--target={}", options.target));
        for external in &options.external {
            args.push(format!("--external:{external}"));
        }
        args.push(format!("--log-level={}", options.log_level));
        args.push(format!("--outfile={}", spec.output_path.display()));

        args
    }
}

impl BundleTool for EsbuildBundler {
    async fn bundle(&self, spec: &BuildSpec) -> Result<()> {
        let args = Self::args(spec);
        log::debug!("{} {}", self.program.display(), args.join(" "));

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_directory)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::CommandFailed {
                command: self.program.display().to_string(),
                error: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let diagnostic = match stderr.trim() {
                "" => format!("esbuild exited with {}", output.status),
                text => text.to_string(),
            };
            return Err(Error::Build {
                module: spec.module_name.clone(),
                diagnostic,
            });
        }

        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!("[esbuild:{}] {}", spec.module_name, line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildOptions, Platform};

    fn spec(options: BuildOptions) -> BuildSpec {
        BuildSpec {
            module_name: "world".into(),
            entry_point: PathBuf::from("/app/src/world.ts"),
            output_path: PathBuf::from("/app/dist/world.esm.js"),
            options,
        }
    }

    #[test]
    fn default_options_map_to_flags() {
        assert_eq!(
            EsbuildBundler::args(&spec(BuildOptions::default())),
            vec![
                "/app/src/world.ts",
                "--bundle",
                "--minify",
                "--sourcemap",
                "--platform=node",
                "--target=es2020",
                "--log-level=info",
                "--outfile=/app/dist/world.esm.js",
            ]
        );
    }

    #[test]
    fn disabled_options_are_omitted_and_externals_listed() {
        let args = EsbuildBundler::args(&spec(BuildOptions {
            minify: false,
            sourcemap: false,
            platform: Platform::Neutral,
            external: vec!["@aws-sdk/client-dynamodb".into(), "uuid".into()],
            ..Default::default()
        }));

        assert!(!args.contains(&"--minify".to_string()));
        assert!(!args.contains(&"--sourcemap".to_string()));
        assert!(args.contains(&"--platform=neutral".to_string()));
        assert!(args.contains(&"--external:@aws-sdk/client-dynamodb".to_string()));
        assert!(args.contains(&"--external:uuid".to_string()));
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = EsbuildBundler::new(dir.path().join("esbuild"), dir.path())
            .bundle(&spec(BuildOptions::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));

        let err = EsbuildBundler::new(dir.path().join("esbuild"), dir.path())
            .verified()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
