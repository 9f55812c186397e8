//! Path splicing for package-relative asset declarations.
//!
//! Paths are handled as plain strings: the output is handed to the bundler
//! verbatim, so no normalisation or platform separator handling happens here.

/// Resolves `path` against `prefix`.
///
/// A path starting with `.` is spliced onto the prefix with the leading dot
/// removed, so `./assets/app.js` under `/vendor/pkg` becomes
/// `/vendor/pkg/assets/app.js`. Anything else (module references, absolute
/// paths) passes through unchanged.
pub fn resolve_path(prefix: &str, path: &str) -> String {
    match path.strip_prefix('.') {
        Some(rest) => format!("{prefix}{rest}"),
        None => path.to_string(),
    }
}

/// Install directory of a package under the vendor root.
pub fn package_root(vendor_root: &str, package_name: &str) -> String {
    format!("{vendor_root}/{package_name}")
}
