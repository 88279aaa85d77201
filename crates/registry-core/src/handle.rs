//! Per-contract handles and deployed instances.

use ethers::{abi::Abi, contract::Contract, providers::Middleware, types::Address};
use registry_types::{normalize_name, Artifact, NetworkId, RegistryError, Result};
use std::{fmt, sync::Arc};

/// Proxy for one artifact, bound to zero or more of provider, network and
/// address.
///
/// Handles are created once per artifact when the registry is built and are
/// updated in place afterwards.
pub struct ContractHandle<M> {
	name: String,
	artifact: Arc<Artifact>,
	provider: Option<Arc<M>>,
	network_id: Option<NetworkId>,
	address: Option<Address>,
}

impl<M: Middleware> ContractHandle<M> {
	/// Creates an unbound handle.
	pub fn new(name: impl Into<String>, artifact: Arc<Artifact>) -> Self {
		Self {
			name: name.into(),
			artifact,
			provider: None,
			network_id: None,
			address: None,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Name the deployed instance is exposed under.
	pub fn normalized_name(&self) -> String {
		normalize_name(&self.name)
	}

	pub fn artifact(&self) -> &Artifact {
		&self.artifact
	}

	pub fn abi(&self) -> &Abi {
		&self.artifact.abi
	}

	pub fn provider(&self) -> Option<&Arc<M>> {
		self.provider.as_ref()
	}

	pub fn network_id(&self) -> Option<&NetworkId> {
		self.network_id.as_ref()
	}

	/// Address resolved for the current network.
	pub fn address(&self) -> Option<Address> {
		self.address
	}

	pub fn set_provider(&mut self, provider: Arc<M>) {
		self.provider = Some(provider);
	}

	/// Switches the handle to `network_id`, picking up the address the
	/// artifact records for it, if any. A malformed address leaves the handle
	/// unbound.
	pub(crate) fn set_network(&mut self, network_id: NetworkId) {
		self.address = self
			.artifact
			.deployed_address(network_id.as_str())
			.ok()
			.flatten();
		self.network_id = Some(network_id);
	}

	pub fn has_network(&self, network_id: &str) -> bool {
		self.artifact.has_network(network_id)
	}

	pub fn deployed_address(&self, network_id: &str) -> Result<Option<Address>> {
		self.artifact.deployed_address(network_id)
	}

	/// Instance of this contract at an arbitrary address.
	pub fn at(&self, address: Address) -> DeployedContract<M> {
		DeployedContract {
			name: self.name.clone(),
			address,
			artifact: self.artifact.clone(),
			provider: self.provider.clone(),
		}
	}

	/// Instance at the address resolved for the current network.
	///
	/// # Errors
	///
	/// Returns `RegistryError::NotDeployed` if no network is bound yet or the
	/// artifact has no address for it.
	pub fn deployed(&self) -> Result<DeployedContract<M>> {
		match self.address {
			Some(address) => Ok(self.at(address)),
			None => Err(RegistryError::NotDeployed {
				contract: self.name.clone(),
				network: self
					.network_id
					.as_ref()
					.map(ToString::to_string)
					.unwrap_or_else(|| "<unresolved>".to_string()),
			}),
		}
	}
}

impl<M> fmt::Debug for ContractHandle<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContractHandle")
			.field("name", &self.name)
			.field("has_provider", &self.provider.is_some())
			.field("network_id", &self.network_id)
			.field("address", &self.address)
			.finish()
	}
}

/// A contract bound to the address it is deployed at.
pub struct DeployedContract<M> {
	name: String,
	address: Address,
	artifact: Arc<Artifact>,
	provider: Option<Arc<M>>,
}

impl<M: Middleware> DeployedContract<M> {
	/// Declared contract name (not normalized).
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn abi(&self) -> &Abi {
		&self.artifact.abi
	}

	pub fn provider(&self) -> Option<&Arc<M>> {
		self.provider.as_ref()
	}

	/// Builds the ethers contract used to encode and send calls.
	///
	/// # Errors
	///
	/// Returns `RegistryError::Configuration` if no provider was bound when the
	/// instance was created.
	pub fn contract(&self) -> Result<Contract<M>> {
		let provider = self.provider.clone().ok_or_else(|| {
			RegistryError::Configuration(format!(
				"{} has no provider, call set_provider() first",
				self.name
			))
		})?;

		Ok(Contract::new(
			self.address,
			self.artifact.abi.clone(),
			provider,
		))
	}
}

impl<M> Clone for DeployedContract<M> {
	fn clone(&self) -> Self {
		Self {
			name: self.name.clone(),
			address: self.address,
			artifact: self.artifact.clone(),
			provider: self.provider.clone(),
		}
	}
}

impl<M> fmt::Debug for DeployedContract<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeployedContract")
			.field("name", &self.name)
			.field("address", &self.address)
			.field("has_provider", &self.provider.is_some())
			.finish()
	}
}
