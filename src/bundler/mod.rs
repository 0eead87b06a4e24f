//! Build and packaging pipeline.
//!
//! Turns a set of independent source modules into one deployable archive per
//! module:
//!
//! ```text
//! ModuleRegistry ─► BuildPlanner ─► BundleExecutor ─► Packager
//!   module names     BuildSpec        BuildResult       <module>.zip
//! ```
//!
//! - [`registry`] - which modules exist
//! - [`planner`] - where each module's entry point and bundle live
//! - [`executor`] - concurrent, fail-fast bundler invocations
//! - [`packager`] - `<module>.zip` with normalized entry names
//! - [`orchestrator`] - the [`Pipeline`] tying the stages together
//!
//! Modules never share state, so each module's build and archive proceed
//! independently once the batch of builds has succeeded.

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod packager;
pub mod planner;
pub mod registry;
pub mod settings;

pub use error::{Context, Error, ErrorExt, ModuleFailure, Result};
pub use executor::{BuildResult, BundleExecutor, BundleTool, EsbuildBundler};
pub use orchestrator::Pipeline;
pub use packager::{ArchiveEntry, ArchiveJob, PackagedArchive, Packager};
pub use planner::{BuildPlanner, BuildSpec};
pub use registry::{ModuleDescriptor, ModuleRegistry, ModuleSource};
pub use settings::{
    ArchiveBackend, BuildOptions, BuildOverrides, PathTemplate, PipelineVariant, Platform,
    Settings, SettingsBuilder,
};
