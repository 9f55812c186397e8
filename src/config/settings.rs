use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ConfigError;

/// Typed view over the options the composer itself reads.
///
/// Keys are camelCase in every source document (`publicPath`, `webpackHmr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Dev-server port.
    pub port: u16,

    /// Public asset path prefix.
    pub public_path: String,

    /// Dev-server host used in the hot-reload client URL.
    pub host: String,

    /// Hot-reload poll interval in milliseconds.
    pub webpack_hmr: u64,

    /// Composer lock file to discover packages from.
    pub composer_lock_file: PathBuf,

    /// Package install root, relative to the application directory when it starts with `.`.
    pub vendor_path: String,

    /// Bundler verbosity flag, passed through untouched.
    pub no_info: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            public_path: "/dist".to_string(),
            host: "http://localhost".to_string(),
            webpack_hmr: 2000,
            composer_lock_file: PathBuf::from("./composer.lock"),
            vendor_path: "./vendor".to_string(),
            no_info: Value::String("true".to_string()),
        }
    }
}

/// The merged configuration handed to skeleton and module factories.
///
/// Holds every key from every source, including ones the composer never
/// reads, alongside the typed [`Settings`] deserialized once at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    values: Map<String, Value>,
    settings: Settings,
}

impl Configuration {
    /// The built-in defaults.
    pub fn defaults() -> Self {
        let settings = Settings::default();
        let values = match serde_json::to_value(&settings) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self { values, settings }
    }

    /// Builds a configuration from an already merged map.
    pub fn from_map(values: Map<String, Value>) -> Result<Self, ConfigError> {
        let settings = Settings::deserialize(Value::Object(values.clone()))?;
        Ok(Self { values, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Raw value for `key`, including keys unknown to [`Settings`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn port(&self) -> u16 {
        self.settings.port
    }

    pub fn public_path(&self) -> &str {
        &self.settings.public_path
    }

    pub fn host(&self) -> &str {
        &self.settings.host
    }

    pub fn webpack_hmr(&self) -> u64 {
        self.settings.webpack_hmr
    }

    pub fn composer_lock_file(&self) -> &Path {
        &self.settings.composer_lock_file
    }

    pub fn vendor_path(&self) -> &str {
        &self.settings.vendor_path
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::defaults()
    }
}
