//! Subcommand implementations.

use anyhow::{Context, Result};
use ethers::{
	providers::{Http, Middleware, Provider},
	types::Address,
	utils::to_checksum,
};
use registry_config::{ArtifactLoader, RegistryConfig};
use registry_core::ContractRegistry;
use registry_types::{normalize_name, ArtifactBundle, RegistryError};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Serialize, PartialEq)]
struct ContractSummary {
	name: String,
	accessor: String,
	/// Network id to address; `None` for records without an address.
	/// Malformed addresses are shown as written.
	networks: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Serialize)]
struct ResolutionReport {
	network_id: String,
	contracts: BTreeMap<String, String>,
}

fn format_address(address: Address) -> String {
	to_checksum(&address, None)
}

fn load_bundle(config: &RegistryConfig) -> Result<ArtifactBundle> {
	ArtifactLoader::load(&config.artifacts.path)
		.with_context(|| format!("Failed to load artifacts from {:?}", config.artifacts.path))
}

fn summarize(bundle: &ArtifactBundle) -> Vec<ContractSummary> {
	bundle
		.iter()
		.map(|(name, artifact)| ContractSummary {
			name: name.to_string(),
			accessor: normalize_name(name),
			networks: artifact
				.networks
				.iter()
				.map(|(id, record)| {
					let address = match record.parse_address() {
						Ok(address) => address.map(format_address),
						Err(raw) => Some(raw.to_string()),
					};
					(id.to_string(), address)
				})
				.collect(),
		})
		.collect()
}

/// Builds the report from the instances bound on the registry's active
/// network. When `names` is non-empty only those contracts are reported and
/// each of them must be deployed.
fn report<M: Middleware + 'static>(
	registry: &ContractRegistry<M>,
	names: &[String],
) -> Result<ResolutionReport, RegistryError> {
	let contracts = if names.is_empty() {
		registry
			.instances()
			.map(|(name, instance)| (name.to_string(), format_address(instance.address())))
			.collect()
	} else {
		names
			.iter()
			.map(|name| {
				let instance = registry.handle_required(name)?.deployed()?;
				Ok((normalize_name(name), format_address(instance.address())))
			})
			.collect::<Result<_, RegistryError>>()?
	};

	Ok(ResolutionReport {
		network_id: registry
			.active_network_id()
			.map(ToString::to_string)
			.unwrap_or_default(),
		contracts,
	})
}

pub fn contracts(config: &RegistryConfig, json: bool) -> Result<()> {
	let summaries = summarize(&load_bundle(config)?);

	if json {
		println!("{}", serde_json::to_string_pretty(&summaries)?);
		return Ok(());
	}

	for summary in summaries {
		println!("{} ({})", summary.name, summary.accessor);
		if summary.networks.is_empty() {
			println!("  no deployments");
		}
		for (network_id, address) in summary.networks {
			println!(
				"  {:>8}  {}",
				network_id,
				address.as_deref().unwrap_or("-")
			);
		}
	}

	Ok(())
}

pub async fn resolve(
	config: &RegistryConfig,
	network_id: Option<String>,
	names: &[String],
	json: bool,
) -> Result<()> {
	let bundle = load_bundle(config)?;
	let mut registry = ContractRegistry::<Provider<Http>>::new(bundle, None);

	if let Some(rpc_url) = config.rpc_url() {
		registry
			.connect(Some(rpc_url))
			.context("Failed to configure connection")?;
	}

	let network_id = network_id.or_else(|| config.network_id.as_ref().map(|id| id.to_string()));

	let resolution = match network_id {
		Some(id) => registry.resolve_with_network_id(id),
		None => registry
			.resolve_by_querying_connection()
			.await
			.context("Failed to resolve the connected network")?,
	};

	registry.apply(resolution);
	let report = report(&registry, names)?;

	info!(
		"Resolved {} of {} contracts on network {}",
		report.contracts.len(),
		registry.contract_names().count(),
		report.network_id
	);

	if json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		println!("network {}", report.network_id);
		for (name, address) in &report.contracts {
			println!("  {:<32} {}", name, address);
		}
	}

	Ok(())
}

pub fn validate(config: &RegistryConfig) -> Result<()> {
	let bundle = load_bundle(config)?;

	println!("Configuration is valid");
	println!("Artifacts: {} from {:?}", bundle.len(), config.artifacts.path);
	println!(
		"Connection: {}",
		config.rpc_url().unwrap_or("not configured")
	);
	match &config.network_id {
		Some(id) => println!("Network id: {}", id),
		None => println!("Network id: queried from connection"),
	}

	Ok(())
}
