//! Composition of per-module bundler configurations.

mod builder;
mod pipeline;
mod spec;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{Config, Configuration};
use crate::error::Error;
use crate::merge::merge_maps;
use crate::package::{self, LockFileError, PackageDescriptor};
use crate::paths::resolve_path;

pub use builder::ComposerBuilder;
pub use spec::{default_skeleton, ConfigFactory, ConfigMap, ModuleSpec, Mode, Skeleton};

/// Result of [`Composer::build_modules`], handed to the bundler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildOutput {
    /// Final configuration per module, in registration order.
    pub modules: IndexMap<String, ConfigMap>,
    /// Every module skeleton's `resolve` tree merged together.
    pub resolves: ConfigMap,
}

/// Assembles bundler configurations for registered application modules.
///
/// ## Example
///
/// ```no_run
/// use nettpack::{Composer, ModuleSpec};
/// use serde_json::json;
///
/// let mut composer = Composer::new(Some("app/config/config.neon".as_ref()))?;
/// composer.register_module("admin", ModuleSpec::factory(|name, config, _| {
///     let public_path = format!("{}/{name}/", config.public_path());
///     let output = json!({ "output": { "publicPath": public_path } });
///     output.as_object().cloned().unwrap_or_default()
/// }));
///
/// let output = composer.build_modules()?;
/// println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
/// # Ok::<(), nettpack::Error>(())
/// ```
#[derive(Debug)]
pub struct Composer {
    config: Configuration,
    modules: IndexMap<String, ModuleSpec>,
    skeleton: Skeleton,
    mode: Mode,
    app_dir: PathBuf,
}

impl Composer {
    /// Creates a composer from the defaults, overlaid by `overlay` when that file exists.
    pub fn new(overlay: Option<&Path>) -> Result<Self, Error> {
        let mut config = Config::builder();
        if let Some(path) = overlay {
            config = config.with_file(path, false);
        }
        Ok(Self::builder().with_config(config.build()?).build())
    }

    /// Creates a builder for a composer with custom skeleton, mode or app directory.
    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::default()
    }

    /// Registers a module; registering a name again replaces its definition.
    pub fn register_module(&mut self, name: impl Into<String>, spec: impl Into<ModuleSpec>) {
        let name = name.into();
        tracing::debug!(module = %name, "registered module");
        self.modules.insert(name, spec.into());
    }

    pub fn port(&self) -> u16 {
        self.config.port()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Directory that `.`-relative configuration paths are spliced onto.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Discovers contributing packages from the configured lock file.
    pub fn load_package_assets(&self) -> Result<Vec<PackageDescriptor>, LockFileError> {
        package::load_package_assets(self.config.composer_lock_file())
    }

    /// Builds the final configuration of every registered module.
    ///
    /// Each module starts from a fresh skeleton, receives package aliases,
    /// entries and bundles, then has its own definition merged on top.
    pub fn build_modules(&self) -> Result<BuildOutput, Error> {
        let packages = self.load_package_assets()?;
        let vendor_root = self.vendor_root();

        let mut output = BuildOutput::default();
        for (name, spec) in &self.modules {
            let mut skeleton = self.skeleton.resolve(name, &self.config, self);

            pipeline::apply_resolve(&packages, &mut skeleton, &vendor_root)?;
            pipeline::apply_entry(&packages, &mut skeleton, &vendor_root)?;
            let hot_entry = self.hot_entry(name);
            pipeline::apply_module(
                &packages,
                &mut skeleton,
                &vendor_root,
                name,
                hot_entry.as_deref(),
            )?;

            if let Some(serde_json::Value::Object(resolve)) = skeleton.get("resolve") {
                merge_maps(&mut output.resolves, resolve.clone());
            }

            let module_config = spec.resolve(name, &self.config, self);
            merge_maps(&mut skeleton, module_config);
            output.modules.insert(name.clone(), skeleton);
        }

        tracing::info!(
            modules = output.modules.len(),
            packages = packages.len(),
            mode = %self.mode,
            "composed module configurations"
        );
        Ok(output)
    }

    fn vendor_root(&self) -> String {
        resolve_path(&self.app_dir.to_string_lossy(), self.config.vendor_path())
    }

    /// Hot-reload client entry for `name`; only produced in development mode.
    fn hot_entry(&self, name: &str) -> Option<String> {
        (self.mode == Mode::Development).then(|| {
            format!(
                "webpack-hot-middleware/client?path={}{}/{}/__webpack_hmr&timeout={}",
                self.config.host(),
                self.config.public_path(),
                name,
                self.config.webpack_hmr()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::TempDir;

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    /// Writes `lock` into a temp dir and returns a composer reading it, rooted at `.`.
    fn composer_with_lock(lock: Value, mode: Mode) -> (TempDir, Composer) {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("composer.lock");
        let mut file = std::fs::File::create(&lock_path).unwrap();
        write!(file, "{lock}").unwrap();

        let mut values = Configuration::defaults().as_map().clone();
        values.insert("composerLockFile".into(), json!(lock_path));
        let composer = Composer::builder()
            .with_config(Configuration::from_map(values).unwrap())
            .with_mode(mode)
            .with_app_dir(".")
            .build();
        (dir, composer)
    }

    #[test]
    fn test_port_is_stable() {
        let composer = Composer::new(None).unwrap();
        assert_eq!(composer.port(), 8080);
        assert_eq!(composer.port(), composer.port());
    }

    #[test]
    fn test_overlay_changes_port() {
        let mut file = tempfile::Builder::new().suffix(".neon").tempfile().unwrap();
        writeln!(file, "parameters:\n\tnettpack:\n\t\tport: 9090").unwrap();

        let composer = Composer::new(Some(file.path())).unwrap();

        assert_eq!(composer.port(), 9090);
    }

    #[test]
    fn test_malformed_overlay_fails() {
        let mut file = tempfile::Builder::new().suffix(".neon").tempfile().unwrap();
        writeln!(file, "parameters: [unclosed").unwrap();

        let result = Composer::new(Some(file.path()));

        assert!(matches!(
            result,
            Err(Error::Config(crate::ConfigError::YamlParse { .. }))
        ));
    }

    #[test]
    fn test_missing_overlay_keeps_defaults() {
        let composer = Composer::new(Some(Path::new("/nonexistent/config.neon"))).unwrap();
        assert_eq!(composer.config(), &Configuration::defaults());
    }

    #[test]
    fn test_registration_order_and_replacement() {
        let mut composer = Composer::builder().build();
        composer.register_module("admin", ConfigMap::new());
        composer.register_module("front", ConfigMap::new());
        composer.register_module("admin", map(json!({"devtool": "eval"})));

        let names: Vec<_> = composer.module_names().collect();
        assert_eq!(names, ["admin", "front"]);
    }

    #[test]
    fn test_module_overrides_merge_over_skeleton() {
        let (_dir, mut composer) = composer_with_lock(
            json!({"packages": [{"name": "acme/ui", "extra": {"nettpack": {
                "resolve": {"ui": "./js"},
                "entry": {"ui": "./js/ui.js"}
            }}}]}),
            Mode::Production,
        );
        composer.register_module(
            "front",
            map(json!({"entry": {"front": "./www/front.js"}, "resolve": {"extensions": [".js"]}})),
        );

        let output = composer.build_modules().unwrap();
        let front = &output.modules["front"];

        assert_eq!(
            front["entry"],
            json!({"ui": "./vendor/acme/ui/js/ui.js", "front": "./www/front.js"})
        );
        assert_eq!(front["resolve"]["alias"], json!({"ui": "./vendor/acme/ui/js"}));
        assert_eq!(front["resolve"]["extensions"], json!([".js"]));
        // Module overrides are merged after resolves are collected.
        assert_eq!(
            Value::Object(output.resolves),
            json!({"alias": {"ui": "./vendor/acme/ui/js"}})
        );
    }

    #[test]
    fn test_modules_do_not_share_skeleton_state() {
        let (_dir, mut composer) = composer_with_lock(
            json!({"packages": [{"name": "acme/admin", "extra": {"nettpack": {
                "entry": {},
                "modules": {"admin": "./admin.js"}
            }}}]}),
            Mode::Production,
        );
        composer.register_module("admin", ConfigMap::new());
        composer.register_module("front", ConfigMap::new());

        let output = composer.build_modules().unwrap();

        assert_eq!(
            output.modules["admin"]["entry"]["packages"],
            json!(["./vendor/acme/admin/admin.js"])
        );
        assert_eq!(output.modules["front"]["entry"], json!({}));
    }

    #[test]
    fn test_skeleton_factory_and_development_hot_entry() {
        let (_dir, composer) = composer_with_lock(
            json!({"packages": [{"name": "acme/admin", "extra": {"nettpack": {
                "modules": {"admin": ["./a.js", "./b.js"]}
            }}}]}),
            Mode::Development,
        );
        let mut composer = Composer::builder()
            .with_config(composer.config().clone())
            .with_mode(Mode::Development)
            .with_app_dir("/srv/app")
            .with_skeleton(ModuleSpec::factory(|name, _, _| {
                map(json!({"name": name, "entry": {}, "resolve": {"alias": {}}}))
            }))
            .build();
        composer.register_module("admin", ConfigMap::new());

        let output = composer.build_modules().unwrap();
        let admin = &output.modules["admin"];

        assert_eq!(admin["name"], json!("admin"));
        assert_eq!(
            admin["entry"]["packages"],
            json!([
                "webpack-hot-middleware/client?path=http://localhost/dist/admin/__webpack_hmr&timeout=2000",
                "/srv/app/vendor/acme/admin/a.js",
                "/srv/app/vendor/acme/admin/b.js"
            ])
        );
    }

    #[test]
    fn test_bundles_without_entry_map_fail() {
        let (_dir, mut composer) = composer_with_lock(
            json!({"packages": [{"name": "acme/admin", "extra": {"nettpack": {
                "modules": {"admin": "./admin.js"}
            }}}]}),
            Mode::Production,
        );
        composer.register_module("admin", ConfigMap::new());

        let result = composer.build_modules();

        assert!(matches!(result, Err(Error::Precondition(_))));
    }

    #[test]
    fn test_factory_module_merges_over_package_skeleton() {
        let (_dir, mut composer) = composer_with_lock(
            json!({"packages": [{"name": "acme/admin", "extra": {"nettpack": {
                "entry": {"vendor": "./vendor.js"},
                "resolve": {"admin": "./src"},
                "modules": {"admin": "./admin.js"}
            }}}]}),
            Mode::Production,
        );
        composer.register_module(
            "admin",
            ModuleSpec::factory(|name, config, _| {
                map(json!({
                    "entry": {
                        "vendor": format!("./www/{name}.js"),
                        "packages": ["./www/extra.js"]
                    },
                    "resolve": {"alias": {"app": "./www"}},
                    "devServer": {"port": config.port()}
                }))
            }),
        );

        let output = composer.build_modules().unwrap();
        let admin = &output.modules["admin"];

        assert_eq!(admin["entry"]["vendor"], json!("./www/admin.js"));
        assert_eq!(
            admin["entry"]["packages"],
            json!(["./vendor/acme/admin/admin.js", "./www/extra.js"])
        );
        assert_eq!(
            admin["resolve"]["alias"],
            json!({"admin": "./vendor/acme/admin/src", "app": "./www"})
        );
        assert_eq!(admin["devServer"]["port"], json!(8080));
    }

    #[test]
    fn test_missing_lock_file_fails() {
        let mut values = Configuration::defaults().as_map().clone();
        values.insert("composerLockFile".into(), json!("/nonexistent/composer.lock"));
        let mut composer = Composer::builder()
            .with_config(Configuration::from_map(values).unwrap())
            .build();
        composer.register_module("admin", ConfigMap::new());

        let result = composer.build_modules();

        assert!(matches!(
            result,
            Err(Error::LockFile(LockFileError::Missing(_)))
        ));
    }
}
