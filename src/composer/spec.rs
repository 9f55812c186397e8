use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::Composer;
use crate::config::Configuration;

/// A bundler configuration tree.
pub type ConfigMap = Map<String, Value>;

/// Produces a configuration for the module `name`.
pub type ConfigFactory = Box<dyn Fn(&str, &Configuration, &Composer) -> ConfigMap>;

/// Definition of an application module, or of the base skeleton every module starts from.
pub enum ModuleSpec {
    /// A fixed configuration, deep-cloned each time it is used.
    Static(ConfigMap),
    /// Called once per module with `(name, config, composer)`.
    Factory(ConfigFactory),
}

impl ModuleSpec {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&str, &Configuration, &Composer) -> ConfigMap + 'static,
    {
        ModuleSpec::Factory(Box::new(factory))
    }

    /// Produces a fresh configuration owned by the caller.
    ///
    /// Static specs are cloned in full, so mutating the result never leaks
    /// into the next module built from the same spec.
    pub fn resolve(&self, name: &str, config: &Configuration, composer: &Composer) -> ConfigMap {
        match self {
            ModuleSpec::Static(map) => map.clone(),
            ModuleSpec::Factory(factory) => factory(name, config, composer),
        }
    }
}

impl From<ConfigMap> for ModuleSpec {
    fn from(map: ConfigMap) -> Self {
        ModuleSpec::Static(map)
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSpec::Static(map) => f.debug_tuple("Static").field(map).finish(),
            ModuleSpec::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Base configuration every module starts from, before package contributions.
pub type Skeleton = ModuleSpec;

/// Skeleton used when none is supplied: an empty alias table.
pub fn default_skeleton() -> Skeleton {
    match json!({ "resolve": { "alias": {} } }) {
        Value::Object(map) => Skeleton::Static(map),
        _ => Skeleton::Static(Map::new()),
    }
}

/// Build mode; development adds the hot-reload client to package bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(format!("unknown mode '{other}' (expected development or production)")),
        }
    }
}
