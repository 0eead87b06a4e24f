//! Bundler options shared across modules and their per-module overrides.

use std::fmt;

/// Target platform passed to the bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Node.js runtime (serverless functions).
    #[default]
    Node,
    /// Browser runtime.
    Browser,
    /// No platform-specific defaults.
    Neutral,
}

impl Platform {
    /// Value passed to the bundler's `--platform` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Browser => "browser",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options handed to the external bundler for one module.
///
/// The defaults reproduce the deployment configuration: bundling and
/// minification on, source maps on, Node platform, `es2020` target, nothing
/// externalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Inline imported modules into the output.
    pub bundle: bool,

    /// Minify the output.
    pub minify: bool,

    /// Emit a companion `.map` file next to the output.
    pub sourcemap: bool,

    /// Target platform.
    pub platform: Platform,

    /// Language target version (e.g. `es2020`, `node18`).
    pub target: String,

    /// Packages left as runtime imports instead of being inlined.
    pub external: Vec<String>,

    /// Bundler log verbosity.
    pub log_level: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            bundle: true,
            minify: true,
            sourcemap: true,
            platform: Platform::Node,
            target: "es2020".to_string(),
            external: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl BuildOptions {
    /// Returns a copy of these options with `overrides` applied.
    ///
    /// Every field set in `overrides` wins over the value in `self`.
    pub fn merged(&self, overrides: &BuildOverrides) -> Self {
        Self {
            bundle: overrides.bundle.unwrap_or(self.bundle),
            minify: overrides.minify.unwrap_or(self.minify),
            sourcemap: overrides.sourcemap.unwrap_or(self.sourcemap),
            platform: overrides.platform.unwrap_or(self.platform),
            target: overrides
                .target
                .clone()
                .unwrap_or_else(|| self.target.clone()),
            external: overrides
                .external
                .clone()
                .unwrap_or_else(|| self.external.clone()),
            log_level: overrides
                .log_level
                .clone()
                .unwrap_or_else(|| self.log_level.clone()),
        }
    }
}

/// Partial [`BuildOptions`] used for `[options]` and `[overrides.<module>]`
/// tables in `bundle.toml`.
///
/// # Example
///
/// ```toml
/// [overrides.getUser]
/// sourcemap = false
/// external = ["@aws-sdk/client-dynamodb"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOverrides {
    /// Override for [`BuildOptions::bundle`].
    pub bundle: Option<bool>,
    /// Override for [`BuildOptions::minify`].
    pub minify: Option<bool>,
    /// Override for [`BuildOptions::sourcemap`].
    pub sourcemap: Option<bool>,
    /// Override for [`BuildOptions::platform`].
    pub platform: Option<Platform>,
    /// Override for [`BuildOptions::target`].
    pub target: Option<String>,
    /// Override for [`BuildOptions::external`].
    pub external: Option<Vec<String>>,
    /// Override for [`BuildOptions::log_level`].
    #[serde(rename = "log-level", alias = "log_level")]
    pub log_level: Option<String>,
}

impl BuildOverrides {
    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
