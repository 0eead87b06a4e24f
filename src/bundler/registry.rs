//! Module registry: the set of independently bundleable modules.
//!
//! A registry is resolved once at pipeline start from one of three sources:
//!
//! - an explicit list of names
//! - the exports of an index file (`export { default as world } from './world'`)
//! - the entry files found in a source directory
//!
//! Whatever the source, names are validated up front: each must be a non-empty
//! identifier and appear exactly once. A registry that passes validation can no
//! longer fail; an empty registry is valid and produces a no-op run.

use crate::bundler::{Error, Result};
use regex::Regex;
use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// One independently bundleable module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleDescriptor {
    name: String,
}

impl ModuleDescriptor {
    /// Module name. Unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Where the module set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    /// Fixed list of names.
    Names(Vec<String>),
    /// Exported names of an index file.
    Index(PathBuf),
    /// Entry files named `<prefix><module><suffix>` directly inside `directory`.
    Directory {
        /// Directory to scan.
        directory: PathBuf,
        /// File name text before the module name, e.g. `fn-`.
        prefix: String,
        /// File name text after the module name, e.g. `.ts`.
        suffix: String,
    },
}

/// Ordered, duplicate-free set of modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Builds a registry from explicit names, preserving their order.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if a name is empty, contains characters other
    /// than ASCII letters, digits, `_`, `$` or `-`, or is listed twice.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        for name in names {
            let name = name.into();
            validate_name(&name)?;
            if !seen.insert(name.clone()) {
                return Err(Error::Configuration(format!(
                    "module `{name}` is registered more than once"
                )));
            }
            modules.push(ModuleDescriptor { name });
        }

        Ok(Self { modules })
    }

    /// Resolves a registry from `source`.
    pub async fn load(source: &ModuleSource) -> Result<Self> {
        match source {
            ModuleSource::Names(names) => Self::from_names(names.iter().cloned()),
            ModuleSource::Index(path) => Self::from_index(path).await,
            ModuleSource::Directory {
                directory,
                prefix,
                suffix,
            } => Self::discover(directory, prefix, suffix).await,
        }
    }

    /// Builds a registry from the names exported by an index file.
    pub async fn from_index(path: &Path) -> Result<Self> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| {
                Error::Configuration(format!(
                    "cannot read module index {}: {e}",
                    path.display()
                ))
            })?;
        if let Some(statement) = unnamed_export(&source) {
            return Err(Error::Configuration(format!(
                "module index {} exports modules without a name: `{statement}`; \
                 use `export * as <name> from ...` or list the modules explicitly",
                path.display()
            )));
        }
        let names = exported_names(&source);
        log::debug!("{} exports {} module(s)", path.display(), names.len());
        Self::from_names(names)
    }

    /// Builds a registry from the entry files in `directory`.
    ///
    /// A file `<prefix><name><suffix>` registers `name`. The `index` entry
    /// and names containing a dot (`*.d.ts`, `*.test.ts`, `*.spec.ts`) are
    /// skipped. Names are sorted.
    pub async fn discover(directory: &Path, prefix: &str, suffix: &str) -> Result<Self> {
        let directory_buf = directory.to_path_buf();
        let prefix = prefix.to_string();
        let suffix = suffix.to_string();

        let names = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let mut names = Vec::new();
            for entry in walkdir::WalkDir::new(&directory_buf)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let file_name = entry.file_name().to_string_lossy();
                let Some(stem) = file_name
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                else {
                    continue;
                };
                // dotted stems are declaration, test or helper files
                if stem.is_empty() || stem == "index" || stem.contains('.') {
                    log::debug!("Skipping {file_name}");
                    continue;
                }
                names.push(stem.to_string());
            }
            Ok(names)
        })
        .await
        .map_err(|e| Error::GenericError(format!("module discovery task panicked: {e}")))?
        .map_err(|e| match e {
            Error::WalkDir(walk) => Error::Configuration(format!(
                "cannot scan module directory {}: {walk}",
                directory.display()
            )),
            other => other,
        })?;

        Self::from_names(names)
    }

    /// Modules in registration order.
    pub fn list_modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Module names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(ModuleDescriptor::name)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if there is nothing to build.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Configuration("module name cannot be empty".into()));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-'));
    if !valid {
        return Err(Error::Configuration(format!(
            "module name `{name}` must only contain letters, digits, `_`, `$` or `-`"
        )));
    }
    Ok(())
}

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("valid regex"));

static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s*\{([^}]*)\}").expect("valid regex"));

static EXPORT_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s*\*\s*as\s+([A-Za-z_$][\w$]*)").expect("valid regex")
});

static EXPORT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"export\s+(?:async\s+)?(?:const|let|var|function\s*\*?|class)\s*([A-Za-z_$][\w$]*)",
    )
    .expect("valid regex")
});

static EXPORT_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"export\s*\*\s*from\s*['"][^'"]*['"]"#).expect("valid regex")
});

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\b[^;\n]*").expect("valid regex"));

/// First export statement whose modules cannot be named from the index alone:
/// `export * from`, `export default`, or an un-aliased `default` in a list.
fn unnamed_export(source: &str) -> Option<String> {
    let source = COMMENTS.replace_all(source, "");
    let mut found: Vec<(usize, &str)> = Vec::new();

    for regex in [&*EXPORT_ALL, &*EXPORT_DEFAULT] {
        if let Some(m) = regex.find(&source) {
            found.push((m.start(), m.as_str()));
        }
    }
    for caps in EXPORT_LIST.captures_iter(&source) {
        let (Some(statement), Some(list)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if list.as_str().split(',').any(|item| item.trim() == "default") {
            found.push((statement.start(), statement.as_str()));
        }
    }

    found
        .into_iter()
        .min_by_key(|(position, _)| *position)
        .map(|(_, statement)| statement.trim().to_string())
}

/// Value exports of an ES module, in source order, without duplicates.
///
/// Type-only exports (`export type { .. }`, `export { type X }`) are ignored.
fn exported_names(source: &str) -> Vec<String> {
    let source = COMMENTS.replace_all(source, "");
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in EXPORT_LIST.captures_iter(&source) {
        let Some(list) = caps.get(1) else { continue };
        for (offset, item) in list.as_str().split(',').enumerate() {
            let item = item.trim();
            if item.is_empty() || item.starts_with("type ") {
                continue;
            }
            let exported = match item.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item,
            };
            if exported != "default" {
                found.push((list.start() + offset, exported.to_string()));
            }
        }
    }
    for regex in [&*EXPORT_NAMESPACE, &*EXPORT_DECLARATION] {
        for caps in regex.captures_iter(&source) {
            if let Some(name) = caps.get(1) {
                found.push((name.start(), name.as_str().to_string()));
            }
        }
    }

    found.sort_by_key(|(position, _)| *position);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, name)| seen.insert(name.clone()).then_some(name))
        .collect()
}
