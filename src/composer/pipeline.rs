//! Per-module steps applying package contributions to a skeleton.
//!
//! The steps run in a fixed order: aliases, entries, then package bundles.
//! The bundle step writes into the `entry` mapping and requires it to exist.

use serde_json::{Map, Value};

use super::spec::ConfigMap;
use crate::error::Error;
use crate::package::PackageDescriptor;
use crate::paths::{package_root, resolve_path};

const RESOLVE_KEY: &str = "resolve";
const ALIAS_KEY: &str = "alias";
const ENTRY_KEY: &str = "entry";
const PACKAGES_KEY: &str = "packages";

/// Writes every package alias into `resolve.alias`, creating both mappings if absent.
pub(crate) fn apply_resolve(
    packages: &[PackageDescriptor],
    skeleton: &mut ConfigMap,
    vendor_root: &str,
) -> Result<(), Error> {
    for package in packages {
        let Some(aliases) = &package.settings.resolve else {
            continue;
        };

        let resolve = child_map(skeleton, RESOLVE_KEY)?;
        let alias = child_map(resolve, ALIAS_KEY)?;
        let root = package_root(vendor_root, &package.name);
        for (name, path) in aliases {
            alias.insert(name.clone(), Value::String(resolve_path(&root, path)));
        }
    }
    Ok(())
}

/// Writes every package entry point into `entry`, creating it if absent.
pub(crate) fn apply_entry(
    packages: &[PackageDescriptor],
    skeleton: &mut ConfigMap,
    vendor_root: &str,
) -> Result<(), Error> {
    for package in packages {
        let Some(entries) = &package.settings.entry else {
            continue;
        };

        let entry = child_map(skeleton, ENTRY_KEY)?;
        let root = package_root(vendor_root, &package.name);
        for (name, path) in entries {
            entry.insert(name.clone(), Value::String(resolve_path(&root, path)));
        }
    }
    Ok(())
}

/// Appends the bundles packages declare for `module_name` to `entry.packages`.
///
/// `entry.packages` is reset when absent or not a sequence; `hot_entry` is
/// pushed first on reset. Fails when `entry` was never initialised.
pub(crate) fn apply_module(
    packages: &[PackageDescriptor],
    skeleton: &mut ConfigMap,
    vendor_root: &str,
    module_name: &str,
    hot_entry: Option<&str>,
) -> Result<(), Error> {
    for package in packages {
        let Some(declared) = package
            .settings
            .modules
            .as_ref()
            .and_then(|modules| modules.get(module_name))
        else {
            continue;
        };

        let Some(Value::Object(entry)) = skeleton.get_mut(ENTRY_KEY) else {
            return Err(Error::Precondition(format!(
                "package '{}' declares bundles for module '{module_name}' \
                 but the skeleton has no `{ENTRY_KEY}` mapping",
                package.name
            )));
        };

        if !matches!(entry.get(PACKAGES_KEY), Some(Value::Array(_))) {
            let initial = hot_entry
                .map(|url| vec![Value::String(url.to_string())])
                .unwrap_or_default();
            entry.insert(PACKAGES_KEY.to_string(), Value::Array(initial));
        }

        let Some(Value::Array(bundles)) = entry.get_mut(PACKAGES_KEY) else {
            continue;
        };
        let root = package_root(vendor_root, &package.name);
        tracing::debug!(
            package = %package.name,
            module = module_name,
            "applying package bundles"
        );
        bundles.extend(
            declared
                .paths()
                .iter()
                .map(|path| Value::String(resolve_path(&root, path))),
        );
    }
    Ok(())
}

/// Returns the mapping under `key`, inserting an empty one if the key is absent.
fn child_map<'a>(parent: &'a mut ConfigMap, key: &str) -> Result<&'a mut ConfigMap, Error> {
    let value = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::Precondition(format!(
            "expected `{key}` to be a mapping, found {other}"
        ))),
    }
}
