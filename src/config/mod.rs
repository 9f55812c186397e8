//! Configuration loading and management.

mod builder;
mod env;
mod error;
mod file;
mod settings;
mod source;

pub use builder::Config;
pub use error::ConfigError;
pub use env::EnvSource;
pub use file::FileSource;
pub use settings::{Configuration, Settings};
pub use source::{ConfigEntry, ConfigSource};
