//! Package discovery from a composer lock file.
//!
//! Only packages whose manifest carries an `extra.nettpack` block contribute
//! to the build; everything else in the lock file is ignored.

mod error;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::LockFileError;

/// Key under a package's `extra` block that marks it as a contributor.
const EXTENSION_KEY: &str = "nettpack";

/// Asset declarations of one package, with paths relative to its install root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Entry point name to path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<IndexMap<String, String>>,

    /// Alias name to path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<IndexMap<String, String>>,

    /// Application module name to the bundle path(s) it gets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<IndexMap<String, ModuleEntries>>,
}

/// One path or several, as written in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleEntries {
    Single(String),
    Many(Vec<String>),
}

impl ModuleEntries {
    pub fn paths(&self) -> &[String] {
        match self {
            ModuleEntries::Single(path) => std::slice::from_ref(path),
            ModuleEntries::Many(paths) => paths,
        }
    }
}

/// A package that declared nettpack settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub settings: PackageSettings,
}

#[derive(Debug, Deserialize)]
struct LockFile {
    #[serde(default)]
    packages: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: String,
    /// PHP writes an empty `extra` as `[]`, so any JSON value is accepted here.
    #[serde(default)]
    extra: Option<Value>,
}

/// Reads the lock file at `path` and returns every contributing package in lock order.
pub fn load_package_assets(path: &Path) -> Result<Vec<PackageDescriptor>, LockFileError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LockFileError::Missing(path.to_path_buf())
        } else {
            LockFileError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let parse_error = |source| LockFileError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let lock: LockFile = serde_json::from_str(&contents).map_err(parse_error)?;
    let total = lock.packages.len();

    let mut packages = Vec::new();
    for package in lock.packages {
        let declared = match package.extra {
            Some(Value::Object(mut extra)) => extra.remove(EXTENSION_KEY),
            _ => None,
        };

        let settings = match declared {
            None | Some(Value::Null) | Some(Value::Bool(false)) => continue,
            // An empty PHP array stands in for an empty settings object.
            Some(Value::Array(items)) if items.is_empty() => PackageSettings::default(),
            Some(value) => serde_json::from_value::<PackageSettings>(value).map_err(parse_error)?,
        };
        tracing::debug!(package = %package.name, "discovered nettpack package");
        packages.push(PackageDescriptor {
            name: package.name,
            settings,
        });
    }

    tracing::debug!(
        lock_file = %path.display(),
        total,
        contributing = packages.len(),
        "loaded package assets"
    );
    Ok(packages)
}
