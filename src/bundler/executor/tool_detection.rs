//! External tool detection and availability checking.
//!
//! This module locates the esbuild executable used by [`EsbuildBundler`] and
//! checks it before any build starts, so a missing tool is reported once as a
//! configuration problem instead of once per module.
//!
//! [`EsbuildBundler`]: super::EsbuildBundler

use std::path::{Path, PathBuf};

/// Locates esbuild for a project.
///
/// Search order:
/// 1. `node_modules/.bin/esbuild` under `project_root` (the project's pinned version)
/// 2. `esbuild` on `PATH`
pub fn find_esbuild(project_root: &Path) -> Option<PathBuf> {
    let local_name = if cfg!(windows) { "esbuild.cmd" } else { "esbuild" };
    let local = project_root
        .join("node_modules")
        .join(".bin")
        .join(local_name);
    if local.is_file() {
        log::debug!("Found project-local esbuild at: {}", local.display());
        return Some(local);
    }

    match which::which("esbuild") {
        Ok(path) => {
            log::debug!("Found esbuild at: {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("esbuild not found in PATH: {}", e);
            None
        }
    }
}

/// Runs `esbuild --version`.
///
/// Returns the reported version, or `None` if the executable cannot be run or
/// exits unsuccessfully. Failures are logged with the reason.
pub async fn esbuild_version(program: &Path) -> Option<String> {
    match tokio::process::Command::new(program)
        .arg("--version")
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("✓ esbuild available: {}", version);
            Some(version)
        }
        Ok(output) => {
            log::warn!(
                "esbuild found at {} but --version check failed (exit code: {:?}). \
                 Stderr: {}",
                program.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            log::warn!(
                "esbuild found at {} but failed to execute: {}. \
                 Check file permissions.",
                program.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_project_local_binary() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin).unwrap();
        let name = if cfg!(windows) { "esbuild.cmd" } else { "esbuild" };
        std::fs::write(bin.join(name), "").unwrap();

        assert_eq!(find_esbuild(dir.path()), Some(bin.join(name)));
    }

    #[tokio::test]
    async fn unrunnable_program_has_no_version() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(esbuild_version(&dir.path().join("missing-esbuild")).await, None);
    }
}
