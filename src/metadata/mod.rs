//! Project metadata from package.json

use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the npm manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// The parts of package.json the bundler reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageManifest {
    /// Package name
    pub name: Option<String>,

    /// Package version
    pub version: Option<String>,

    /// Runtime dependencies, name to version range
    pub dependencies: BTreeMap<String, String>,

    /// Peer dependencies; provided by the runtime, never bundled
    #[serde(rename = "peerDependencies")]
    pub peer_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Names of every dependency a bundle may leave external, sorted.
    pub fn dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.peer_dependencies.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Loads `<project_root>/package.json`.
///
/// Returns `Ok(None)` when the project has no package.json.
pub fn load_package_manifest(project_root: &Path) -> Result<Option<PackageManifest>> {
    let path = project_root.join(PACKAGE_JSON);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BundlerError::Cli(CliError::ExecutionFailed {
                command: "read_package_json".to_string(),
                reason: format!("Failed to read {}: {}", path.display(), e),
            }));
        }
    };

    let manifest = serde_json::from_str(&contents).map_err(|e| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: format!("Failed to parse {}: {}", path.display(), e),
        })
    })?;

    Ok(Some(manifest))
}
