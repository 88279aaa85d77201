//! Result of resolving deployments for one network.

use crate::handle::DeployedContract;
use ethers::{providers::Middleware, types::Address};
use registry_types::NetworkId;
use std::{collections::BTreeMap, fmt};

/// Deployed instances found for a network, keyed by normalized contract name.
///
/// Produced by the registry without mutating it; merge it back with
/// [`ContractRegistry::apply`](crate::ContractRegistry::apply).
pub struct ResolutionResult<M> {
	network_id: NetworkId,
	deployments: BTreeMap<String, DeployedContract<M>>,
}

impl<M: Middleware> ResolutionResult<M> {
	pub(crate) fn new(
		network_id: NetworkId,
		deployments: BTreeMap<String, DeployedContract<M>>,
	) -> Self {
		Self {
			network_id,
			deployments,
		}
	}

	pub fn network_id(&self) -> &NetworkId {
		&self.network_id
	}

	pub fn get(&self, normalized_name: &str) -> Option<&DeployedContract<M>> {
		self.deployments.get(normalized_name)
	}

	pub fn deployments(&self) -> impl Iterator<Item = (&str, &DeployedContract<M>)> {
		self.deployments
			.iter()
			.map(|(name, instance)| (name.as_str(), instance))
	}

	/// Normalized name to address, without the instances.
	pub fn addresses(&self) -> BTreeMap<String, Address> {
		self.deployments
			.iter()
			.map(|(name, instance)| (name.clone(), instance.address()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.deployments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.deployments.is_empty()
	}

	pub(crate) fn into_parts(self) -> (NetworkId, BTreeMap<String, DeployedContract<M>>) {
		(self.network_id, self.deployments)
	}
}

impl<M> Clone for ResolutionResult<M> {
	fn clone(&self) -> Self {
		Self {
			network_id: self.network_id.clone(),
			deployments: self.deployments.clone(),
		}
	}
}

impl<M> fmt::Debug for ResolutionResult<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolutionResult")
			.field("network_id", &self.network_id)
			.field("deployments", &self.deployments.keys().collect::<Vec<_>>())
			.finish()
	}
}
