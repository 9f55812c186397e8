//! nettpack CLI
//!
//! Composes bundler configurations and prints them as JSON for the bundler
//! invocation to consume.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use nettpack::{Composer, Config, ConfigMap, Configuration, ModuleSpec, Mode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nettpack")]
#[command(about = "Compose bundler configurations from composer packages", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every module configuration and print it as JSON
    Build {
        #[command(flatten)]
        config: ConfigArgs,

        /// Module to build, optionally with a JSON file of overrides (NAME or NAME=FILE)
        #[arg(long = "module", short = 'm', required = true)]
        modules: Vec<String>,

        /// JSON file with the base skeleton every module starts from
        #[arg(long)]
        skeleton: Option<PathBuf>,

        /// Build mode; development adds the hot-reload client
        #[arg(long, default_value = "production", env = "NETTPACK_MODE")]
        mode: Mode,

        /// Directory that `.`-relative paths are resolved against (default: current directory)
        #[arg(long)]
        app_dir: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the configured dev-server port
    Port {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List packages from the lock file that declare nettpack settings
    Packages {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Application config document; only `parameters.nettpack` is read
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Prefix of environment overrides (e.g. NETTPACK__PORT=3000)
    #[arg(long, default_value = "NETTPACK")]
    env_prefix: String,
}

impl ConfigArgs {
    fn load(&self) -> Result<Configuration, nettpack::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.config {
            builder = builder.with_file(path, false);
        }
        builder.with_env(&self.env_prefix, "__").build()
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Nettpack(#[from] nettpack::Error),

    #[error(transparent)]
    Config(#[from] nettpack::ConfigError),

    #[error(transparent)]
    LockFile(#[from] nettpack::LockFileError),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{path}' is not a JSON object: {reason}")]
    InvalidDefinition { path: PathBuf, reason: String },

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nettpack=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Build {
            config,
            modules,
            skeleton,
            mode,
            app_dir,
            pretty,
        } => {
            let mut builder = Composer::builder()
                .with_config(config.load()?)
                .with_mode(mode)
                .with_app_dir(app_dir.unwrap_or_else(|| PathBuf::from(".")));
            if let Some(path) = skeleton {
                builder = builder.with_skeleton(read_definition(&path)?);
            }
            let mut composer = builder.build();

            for module in &modules {
                let (name, spec) = match module.split_once('=') {
                    Some((name, file)) => (name, read_definition(Path::new(file))?),
                    None => (module.as_str(), ConfigMap::new()),
                };
                composer.register_module(name, ModuleSpec::Static(spec));
            }

            let output = composer.build_modules()?;
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{json}");
        }
        Commands::Port { config } => {
            println!("{}", config.load()?.port());
        }
        Commands::Packages { config } => {
            let composer = Composer::builder().with_config(config.load()?).build();
            for package in composer.load_package_assets()? {
                println!("{}\t{}", package.name, serde_json::to_string(&package.settings)?);
            }
        }
    }
    Ok(())
}

fn read_definition(path: &Path) -> Result<ConfigMap, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidDefinition {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
