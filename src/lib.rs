//! Composes per-module bundler configurations from composer package manifests.
//!
//! Packages opt in by declaring an `extra.nettpack` block in their manifest
//! with `entry`, `resolve` and `modules` maps. [`Composer::build_modules`]
//! folds those declarations into a skeleton configuration for every
//! registered application module and merges the module's own overrides on top.

pub mod composer;
pub mod config;
mod error;
pub mod merge;
pub mod package;
pub mod paths;

pub use composer::{
    BuildOutput, Composer, ComposerBuilder, ConfigMap, ModuleSpec, Mode, Skeleton,
};
pub use config::{Config, ConfigError, Configuration};
pub use error::Error;
pub use package::{LockFileError, PackageDescriptor, PackageSettings};
