use std::path::Path;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::ConfigSource;
use super::{ConfigError, Configuration};
use crate::merge::merge_at_path;

/// Builder for loading the composer configuration.
///
/// Starts from the built-in defaults; sources are merged in registration order,
/// later sources overriding earlier ones. Nested mappings are merged
/// recursively and sequences are concatenated.
///
/// ## Example
///
/// ```no_run
/// use nettpack::Config;
///
/// let config = Config::builder()
///     .with_file("app/config/config.neon", false)
///     .with_file("app/config/config.local.neon", false)
///     .with_env("NETTPACK", "__")
///     .build()?;
///
/// println!("dev server on port {}", config.port());
/// # Ok::<(), nettpack::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a document whose `parameters.nettpack` section overlays the configuration.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads overrides from environment variables with the given prefix.
    ///
    /// Environment variables are mapped to config paths by:
    /// 1. Removing the prefix and separator
    /// 2. Splitting remaining segments on the separator
    /// 3. Converting each `UPPER_SNAKE` segment to `camelCase`
    ///
    /// With `NETTPACK` and `__`, `NETTPACK__PUBLIC_PATH=/assets` sets `publicPath`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds a custom source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Merges all sources over the defaults and deserializes the typed settings.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let mut merged = Configuration::defaults().as_map().clone();

        for source in &self.sources {
            for entry in source.entries()? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }

        Configuration::from_map(merged)
    }
}
