//! Path templates keyed by module name.

use crate::bundler::{Error, Result};
use std::{path::PathBuf, str::FromStr};

/// Placeholder replaced by the module name.
pub const MODULE_PLACEHOLDER: &str = "{module}";

/// A path pattern such as `src/{module}.ts`.
///
/// Rendering is a pure string substitution; no filesystem access happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
}

impl PathTemplate {
    /// Parses a template, requiring at least one `{module}` placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the pattern has no placeholder, since
    /// every module would then map onto the same file.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains(MODULE_PLACEHOLDER) {
            return Err(Error::Configuration(format!(
                "path template `{pattern}` has no {MODULE_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { pattern })
    }

    /// Substitutes `module_name` into the pattern.
    pub fn render(&self, module_name: &str) -> PathBuf {
        PathBuf::from(self.pattern.replace(MODULE_PLACEHOLDER, module_name))
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn renders_module_name() {
        let template = PathTemplate::new("dist/{module}.esm.js").unwrap();
        assert_eq!(template.render("world"), Path::new("dist/world.esm.js"));
    }

    #[test]
    fn replaces_every_occurrence() {
        let template: PathTemplate = "functions/{module}/{module}.ts".parse().unwrap();
        assert_eq!(
            template.render("getUser"),
            Path::new("functions/getUser/getUser.ts")
        );
    }

    #[test]
    fn rejects_pattern_without_placeholder() {
        let err = PathTemplate::new("dist/out.js").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
