use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::spec::{default_skeleton, Mode, Skeleton};
use super::Composer;
use crate::config::Configuration;

/// Builder for constructing a [`Composer`].
///
/// Anything left unset falls back to the built-in defaults, the
/// `{ resolve: { alias: {} } }` skeleton, production mode, and the directory
/// of the running executable.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ComposerBuilder {
    config: Option<Configuration>,
    skeleton: Option<Skeleton>,
    mode: Mode,
    app_dir: Option<PathBuf>,
}

impl ComposerBuilder {
    /// Attaches a configuration, usually the result of [`Config::build`](crate::Config::build).
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the base skeleton every module starts from.
    pub fn with_skeleton(mut self, skeleton: impl Into<Skeleton>) -> Self {
        self.skeleton = Some(skeleton.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the directory `.`-relative paths such as `vendorPath` are resolved against.
    pub fn with_app_dir(mut self, app_dir: impl AsRef<Path>) -> Self {
        self.app_dir = Some(app_dir.as_ref().to_path_buf());
        self
    }

    /// Builds the `Composer` with an empty module registry.
    pub fn build(self) -> Composer {
        Composer {
            config: self.config.unwrap_or_default(),
            modules: IndexMap::new(),
            skeleton: self.skeleton.unwrap_or_else(default_skeleton),
            mode: self.mode,
            app_dir: self.app_dir.unwrap_or_else(executable_dir),
        }
    }
}

/// Directory holding the running executable, or `.` when it cannot be determined.
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
