//! HTTP connections built from an RPC endpoint.

use ethers::providers::{Http, Provider};
use registry_types::{RegistryError, Result};
use std::sync::Arc;
use tracing::debug;

/// Creates an HTTP provider for `rpc_url`.
///
/// No request is made here; the endpoint is only contacted by the first call
/// that needs it.
///
/// # Errors
///
/// Returns `RegistryError::Configuration` if the URL is absent, blank or
/// cannot be parsed.
pub fn http_provider(rpc_url: Option<&str>) -> Result<Arc<Provider<Http>>> {
	let rpc_url = rpc_url
		.map(str::trim)
		.filter(|url| !url.is_empty())
		.ok_or_else(|| RegistryError::Configuration("Must specify a provider".to_string()))?;

	debug!("Creating HTTP provider for {}", rpc_url);

	let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
		RegistryError::Configuration(format!("Invalid RPC URL {}: {}", rpc_url, e))
	})?;

	Ok(Arc::new(provider))
}
