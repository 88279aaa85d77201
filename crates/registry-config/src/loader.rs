//! Configuration loading from files and environment.

use crate::{types::*, ConfigError};
use regex::Regex;
use std::{path::Path, str::FromStr, sync::LazyLock};
use tracing::{debug, info};

static ENV_PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"));

pub const ENV_RPC_URL: &str = "REGISTRY_RPC_URL";
pub const ENV_NETWORK_ID: &str = "REGISTRY_NETWORK_ID";
pub const ENV_LOG_LEVEL: &str = "REGISTRY_LOG_LEVEL";
pub const ENV_ARTIFACTS: &str = "REGISTRY_ARTIFACTS";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file, picking the format from its extension.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RegistryConfig, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}

		let contents = std::fs::read_to_string(path)?;
		let contents = Self::substitute_env_vars(&contents)?;

		let config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => {
				return Err(ConfigError::Parse(format!(
					"Unsupported config format: {:?}",
					path
				)))
			}
		};

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<RegistryConfig, ConfigError> {
		toml::from_str(contents).map_err(|e| ConfigError::Parse(format!("Invalid TOML: {}", e)))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<RegistryConfig, ConfigError> {
		serde_json::from_str(contents)
			.map_err(|e| ConfigError::Parse(format!("Invalid JSON: {}", e)))
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<RegistryConfig, ConfigError> {
		serde_yaml::from_str(contents)
			.map_err(|e| ConfigError::Parse(format!("Invalid YAML: {}", e)))
	}

	/// Load from environment variables with optional file override
	pub fn from_env_and_file(file_path: Option<&Path>) -> Result<RegistryConfig, ConfigError> {
		let mut config = match file_path {
			Some(path) => Self::from_file(path)?,
			None => RegistryConfig::default(),
		};

		Self::apply_env_overrides(&mut config);

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Replaces `${VAR}` placeholders with values from the environment.
	///
	/// Lines starting with `#` are comments in both TOML and YAML and are
	/// copied unchanged, so a commented-out placeholder needs no variable.
	pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
		Self::substitute_vars(content, |name| std::env::var(name).ok())
	}

	fn substitute_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut result = String::with_capacity(content.len());

		for line in content.split_inclusive('\n') {
			if line.trim_start().starts_with('#') {
				result.push_str(line);
				continue;
			}

			let mut substituted = line.to_string();
			for cap in ENV_PLACEHOLDER.captures_iter(line) {
				let full_match = &cap[0];
				let var_name = &cap[1];

				let value = lookup(var_name)
					.ok_or_else(|| ConfigError::EnvVarNotFound(var_name.to_string()))?;

				substituted = substituted.replace(full_match, &value);
			}
			result.push_str(&substituted);
		}

		Ok(result)
	}

	/// Apply `REGISTRY_*` environment variable overrides
	pub fn apply_env_overrides(config: &mut RegistryConfig) {
		Self::apply_overrides(config, |name| std::env::var(name).ok());
	}

	fn apply_overrides<F>(config: &mut RegistryConfig, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(rpc_url) = lookup(ENV_RPC_URL) {
			debug!("Overriding RPC URL from environment");
			config.connection = Some(ConnectionConfig { rpc_url });
		}

		if let Some(network_id) = lookup(ENV_NETWORK_ID) {
			debug!("Overriding network id from environment");
			config.network_id = Some(network_id.into());
		}

		if let Some(level) = lookup(ENV_LOG_LEVEL) {
			config.logging.level = level;
		}

		if let Some(path) = lookup(ENV_ARTIFACTS) {
			debug!("Overriding artifacts path from environment");
			config.artifacts.path = path.into();
		}
	}

	/// Validate configuration
	pub fn validate_config(config: &RegistryConfig) -> Result<(), ConfigError> {
		if config.artifacts.path.as_os_str().is_empty() {
			return Err(ConfigError::Validation(
				"Artifacts path must not be empty".to_string(),
			));
		}

		if let Some(connection) = &config.connection {
			let url = connection.rpc_url.trim();
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"RPC URL must start with http:// or https://, got '{}'",
					url
				)));
			}
		}

		if let Some(network_id) = &config.network_id {
			if network_id.as_str().trim().is_empty() {
				return Err(ConfigError::Validation(
					"Network id must not be empty".to_string(),
				));
			}
		}

		tracing::Level::from_str(&config.logging.level).map_err(|_| {
			ConfigError::Validation(format!("Invalid log level: {}", config.logging.level))
		})?;

		Ok(())
	}
}

/// Load configuration from standard locations
pub fn load_config() -> Result<RegistryConfig, ConfigError> {
	// Check for config file in order:
	// 1. Environment variable CONFIG_FILE
	// 2. ./registry.toml
	// 3. ./config/registry.toml
	// 4. Default config with env overrides

	if let Ok(path) = std::env::var("CONFIG_FILE") {
		return ConfigLoader::from_env_and_file(Some(Path::new(&path)));
	}

	let paths = ["./registry.toml", "./config/registry.toml"];

	for path in &paths {
		if Path::new(path).exists() {
			return ConfigLoader::from_env_and_file(Some(Path::new(path)));
		}
	}

	ConfigLoader::from_env_and_file(None)
}
