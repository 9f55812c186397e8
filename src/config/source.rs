use serde_json::{Map, Value};

use super::ConfigError;

/// A value contributed by a configuration source, anchored at `path`.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    pub fn root(map: Map<String, Value>) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Object(map),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

pub trait ConfigSource: std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}
