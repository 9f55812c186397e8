//! File-based configuration overlay.
//!
//! The overlay is one section of a larger application document: only the
//! `parameters.nettpack` sub-tree is read, everything else in the file belongs
//! to the host application.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Section holding overlay parameters inside the document.
const PARAMETERS_KEY: &str = "parameters";
const NETTPACK_KEY: &str = "nettpack";

/// Document format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    /// YAML with NEON leniencies (tab indentation).
    Neon,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            _ => Format::Neon,
        }
    }
}

/// A configuration source that loads the nettpack section of a document.
///
/// Files can be marked as required or optional. Required files that don't exist
/// cause an error; optional files that don't exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let Some(document) = load_document(&self.path, self.required)? else {
            return Ok(vec![]);
        };

        match nettpack_section(document) {
            Some(Value::Object(section)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    keys = section.len(),
                    "loaded config overlay"
                );
                Ok(vec![ConfigEntry::root(section)])
            }
            Some(other) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "ignoring non-mapping `{PARAMETERS_KEY}.{NETTPACK_KEY}` value: {other}"
                );
                Ok(vec![])
            }
            None => Ok(vec![]),
        }
    }
}

fn nettpack_section(document: Value) -> Option<Value> {
    let Value::Object(mut root) = document else {
        return None;
    };
    let Value::Object(mut parameters) = root.remove(PARAMETERS_KEY)? else {
        return None;
    };
    parameters.remove(NETTPACK_KEY)
}

/// Loads and parses a config document.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_document(path: &Path, required: bool) -> Result<Option<Value>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_document(path, &contents).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn parse_document(path: &Path, contents: &str) -> Result<Value, ConfigError> {
    match Format::from_path(path) {
        Format::Toml => toml::from_str(contents).map_err(|e| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source: e,
        }),
        Format::Json => serde_json::from_str(contents).map_err(|e| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        }),
        Format::Neon => {
            let normalized = expand_tab_indentation(contents);
            if normalized.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_yaml::from_str(&normalized).map_err(|e| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Replaces leading tabs with four spaces each; NEON allows tab indentation.
fn expand_tab_indentation(contents: &str) -> String {
    let mut result = String::with_capacity(contents.len());
    for line in contents.lines() {
        let body = line.trim_start_matches('\t');
        let tabs = line.len() - body.len();
        for _ in 0..tabs {
            result.push_str("    ");
        }
        result.push_str(body);
        result.push('\n');
    }
    result
}
