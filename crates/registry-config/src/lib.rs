//! Configuration for the contract registry.
//!
//! Settings are read from a TOML, JSON or YAML file, `${VAR}` placeholders are
//! filled from the environment and `REGISTRY_*` variables override individual
//! fields. Artifact bundles are loaded from disk by [`ArtifactLoader`].

pub mod artifacts;
pub mod loader;
pub mod types;

pub use artifacts::ArtifactLoader;
pub use loader::{load_config, ConfigLoader};
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
