//! Configuration types.

use registry_types::NetworkId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete registry configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistryConfig {
	/// Network to resolve deployments for. When absent the connection is
	/// asked for its network id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub network_id: Option<NetworkId>,
	/// Connection settings (optional)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub connection: Option<ConnectionConfig>,
	/// Where the artifact bundle is read from
	#[serde(default)]
	pub artifacts: ArtifactsConfig,
	/// Logging settings
	#[serde(default)]
	pub logging: LoggingConfig,
}

/// Connection to a node
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
	/// HTTP JSON-RPC endpoint
	pub rpc_url: String,
}

/// Artifact bundle location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
	/// Bundle JSON file or a directory of per-contract artifacts
	pub path: PathBuf,
}

impl Default for ArtifactsConfig {
	fn default() -> Self {
		Self {
			path: PathBuf::from("./build/contracts"),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
	/// trace, debug, info, warn or error
	#[serde(default = "default_log_level")]
	pub level: String,
	/// Emit JSON lines instead of human readable output
	#[serde(default)]
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			json: false,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

impl RegistryConfig {
	pub fn rpc_url(&self) -> Option<&str> {
		self.connection.as_ref().map(|c| c.rpc_url.as_str())
	}
}
