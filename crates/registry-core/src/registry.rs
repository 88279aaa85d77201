//! Registry binding a bundle of artifacts to a connection.
//!
//! The registry owns one [`ContractHandle`] per artifact for its whole
//! lifetime. Resolving deployments never mutates it: both resolution
//! operations return a [`ResolutionResult`] that the caller merges back with
//! [`ContractRegistry::apply`].
//!
//! # Thread Safety
//!
//! All mutation goes through `&mut self`. Two resolutions running side by side
//! each query the connection once; whichever result is applied last wins.

use crate::{
	connection::http_provider,
	handle::{ContractHandle, DeployedContract},
	resolution::ResolutionResult,
};
use ethers::providers::{Http, Middleware, Provider};
use registry_types::{ArtifactBundle, NetworkId, RegistryError, Result};
use std::{collections::BTreeMap, fmt, sync::Arc};
use tracing::{debug, info, warn};

/// Contract handles by name plus the instances deployed on the active network.
pub struct ContractRegistry<M> {
	handles: BTreeMap<String, ContractHandle<M>>,
	instances: BTreeMap<String, DeployedContract<M>>,
	connection: Option<Arc<M>>,
	active_network_id: Option<NetworkId>,
}

impl<M: Middleware + 'static> ContractRegistry<M> {
	/// Creates one unbound handle per artifact in `bundle`.
	///
	/// If `provider` is given it is propagated to every handle straight away,
	/// otherwise the registry starts without a connection.
	pub fn new(bundle: ArtifactBundle, provider: Option<Arc<M>>) -> Self {
		let handles: BTreeMap<_, _> = bundle
			.into_iter()
			.map(|(name, artifact)| {
				let handle = ContractHandle::new(name.clone(), Arc::new(artifact));
				(name, handle)
			})
			.collect();

		info!("Created contract registry with {} contracts", handles.len());

		let mut registry = Self {
			handles,
			instances: BTreeMap::new(),
			connection: None,
			active_network_id: None,
		};

		if let Some(provider) = provider {
			registry.set_provider(provider);
		}

		registry
	}

	/// Replaces the connection and hands the same provider to every handle.
	pub fn set_provider(&mut self, provider: Arc<M>) {
		for handle in self.handles.values_mut() {
			handle.set_provider(provider.clone());
		}
		self.connection = Some(provider);

		info!("Provider set for {} contracts", self.handles.len());
	}

	pub fn connection(&self) -> Option<&Arc<M>> {
		self.connection.as_ref()
	}

	/// Network id of the last applied resolution.
	pub fn active_network_id(&self) -> Option<&NetworkId> {
		self.active_network_id.as_ref()
	}

	/// Handle registered under the exact contract name.
	pub fn handle(&self, name: &str) -> Option<&ContractHandle<M>> {
		self.handles.get(name)
	}

	/// Like [`handle`](Self::handle) but fails for unknown names.
	///
	/// # Errors
	///
	/// Returns `RegistryError::UnknownContract` if no artifact had that name.
	pub fn handle_required(&self, name: &str) -> Result<&ContractHandle<M>> {
		self.handle(name)
			.ok_or_else(|| RegistryError::UnknownContract(name.to_string()))
	}

	pub fn handles(&self) -> impl Iterator<Item = &ContractHandle<M>> {
		self.handles.values()
	}

	pub fn contract_names(&self) -> impl Iterator<Item = &str> {
		self.handles.keys().map(String::as_str)
	}

	/// Deployed instance under its normalized name, e.g. `identityFactory`.
	pub fn instance(&self, normalized_name: &str) -> Option<&DeployedContract<M>> {
		self.instances.get(normalized_name)
	}

	pub fn instances(&self) -> impl Iterator<Item = (&str, &DeployedContract<M>)> {
		self.instances
			.iter()
			.map(|(name, instance)| (name.as_str(), instance))
	}

	/// Looks up every contract's deployment record for `network_id`.
	///
	/// Contracts without a record, or whose record has no address, are left
	/// out of the result. A record with a malformed address is logged and left
	/// out as well. No network I/O is performed.
	pub fn resolve_with_network_id(&self, network_id: impl Into<NetworkId>) -> ResolutionResult<M> {
		let network_id = network_id.into();
		let mut deployments = BTreeMap::new();

		for handle in self.handles.values() {
			match handle.deployed_address(network_id.as_str()) {
				Ok(Some(address)) => {
					debug!(
						contract = %handle.name(),
						network_id = %network_id,
						"Bound contract at {:?}",
						address
					);
					deployments.insert(handle.normalized_name(), handle.at(address));
				}
				Ok(None) => {
					debug!(
						contract = %handle.name(),
						network_id = %network_id,
						has_record = handle.has_network(network_id.as_str()),
						"No deployed address, skipping"
					);
				}
				Err(e) => {
					warn!(
						contract = %handle.name(),
						network_id = %network_id,
						"Skipping contract: {}",
						e
					);
				}
			}
		}

		ResolutionResult::new(network_id, deployments)
	}

	/// Asks the connection for its network id, then resolves for it.
	///
	/// The query is sent exactly once and is not retried.
	///
	/// # Errors
	///
	/// - `RegistryError::Configuration` if no connection was configured. The
	///   transport is not touched in that case.
	/// - `RegistryError::Transport` holding the connection's own error if the
	///   query fails.
	pub async fn resolve_by_querying_connection(&self) -> Result<ResolutionResult<M>>
	where
		M::Error: 'static,
	{
		let connection = self.connection.as_ref().ok_or_else(|| {
			RegistryError::Configuration(
				"Must configure a connection first, use set_provider() or init with a provider"
					.to_string(),
			)
		})?;

		let network_id = connection
			.get_net_version()
			.await
			.map_err(RegistryError::transport)?;

		debug!("Connection reported network id {}", network_id);

		Ok(self.resolve_with_network_id(network_id))
	}

	/// Makes `resolution` the registry's active state.
	///
	/// Every handle is switched to the resolved network, and the instance map
	/// is replaced so it only holds contracts deployed there.
	pub fn apply(&mut self, resolution: ResolutionResult<M>) -> &mut Self {
		let (network_id, deployments) = resolution.into_parts();

		for handle in self.handles.values_mut() {
			handle.set_network(network_id.clone());
		}

		info!(
			"Active network set to {} with {}/{} contracts deployed",
			network_id,
			deployments.len(),
			self.handles.len()
		);

		self.instances = deployments;
		self.active_network_id = Some(network_id);
		self
	}

	/// Resolves for `network_id` and applies the result.
	pub fn bind_network(&mut self, network_id: impl Into<NetworkId>) -> &mut Self {
		let resolution = self.resolve_with_network_id(network_id);
		self.apply(resolution)
	}

	/// Resolves for the connected network and applies the result.
	///
	/// Nothing is changed if the query fails.
	pub async fn bind_connected_network(&mut self) -> Result<&mut Self>
	where
		M::Error: 'static,
	{
		let resolution = self.resolve_by_querying_connection().await?;
		Ok(self.apply(resolution))
	}
}

impl ContractRegistry<Provider<Http>> {
	/// Connects every handle to the HTTP endpoint at `rpc_url`.
	///
	/// # Errors
	///
	/// Returns `RegistryError::Configuration` if the URL is absent or invalid,
	/// leaving the current connection and handle bindings as they were.
	pub fn connect(&mut self, rpc_url: Option<&str>) -> Result<()> {
		let provider = http_provider(rpc_url)?;
		self.set_provider(provider);
		Ok(())
	}
}

impl<M> fmt::Debug for ContractRegistry<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContractRegistry")
			.field("contracts", &self.handles.keys().collect::<Vec<_>>())
			.field("instances", &self.instances.keys().collect::<Vec<_>>())
			.field("connected", &self.connection.is_some())
			.field("active_network_id", &self.active_network_id)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ethers::{
		providers::{MockProvider, ProviderError},
		types::Address,
	};

	type Mocked = Provider<MockProvider>;

	const BUNDLE: &str = r#"{
		"IdentityFactory": {
			"networks": {
				"1": { "address": "0x00000000000000000000000000000000000000aa" },
				"42": { "address": "0x00000000000000000000000000000000000000bb" }
			}
		},
		"Proxy": {
			"networks": {}
		},
		"RecoverableController": {
			"networks": {
				"1": { "address": "" },
				"42": { "address": "0x00000000000000000000000000000000000000cc" }
			}
		},
		"uPortRegistry": {
			"networks": {
				"1": { "address": "0x00000000000000000000000000000000000000dd" }
			}
		}
	}"#;

	fn bundle() -> ArtifactBundle {
		ArtifactBundle::from_json(BUNDLE).unwrap()
	}

	fn mocked() -> (Arc<Mocked>, MockProvider) {
		let (provider, mock) = Provider::mocked();
		(Arc::new(provider), mock)
	}

	fn addr(low: u64) -> Address {
		Address::from_low_u64_be(low)
	}

	#[test]
	fn test_handle_for_every_artifact() {
		let bundle = bundle();
		let names: Vec<String> = bundle.names().map(String::from).collect();
		let registry = ContractRegistry::<Mocked>::new(bundle, None);

		for name in &names {
			let handle = registry.handle(name).unwrap();
			assert_eq!(handle.name(), name);
			assert!(handle.provider().is_none());
			assert!(handle.network_id().is_none());
		}
		assert_eq!(registry.contract_names().count(), names.len());
		assert!(registry.connection().is_none());
		assert!(registry.active_network_id().is_none());
		assert_eq!(registry.instances().count(), 0);
	}

	#[test]
	fn test_handle_required() {
		let registry = ContractRegistry::<Mocked>::new(bundle(), None);

		assert!(registry.handle_required("Proxy").is_ok());
		assert!(matches!(
			registry.handle_required("proxy").unwrap_err(),
			RegistryError::UnknownContract(_)
		));
	}

	#[test]
	fn test_new_with_provider_propagates() {
		let (provider, _mock) = mocked();
		let registry = ContractRegistry::new(bundle(), Some(provider.clone()));

		assert!(Arc::ptr_eq(registry.connection().unwrap(), &provider));
		for handle in registry.handles() {
			assert!(Arc::ptr_eq(handle.provider().unwrap(), &provider));
		}
	}

	#[test]
	fn test_set_provider_replaces_previous() {
		let (first, _mock1) = mocked();
		let (second, _mock2) = mocked();
		let mut registry = ContractRegistry::new(bundle(), Some(first.clone()));

		registry.set_provider(second.clone());

		assert!(Arc::ptr_eq(registry.connection().unwrap(), &second));
		for handle in registry.handles() {
			assert!(Arc::ptr_eq(handle.provider().unwrap(), &second));
			assert!(!Arc::ptr_eq(handle.provider().unwrap(), &first));
		}
	}

	#[test]
	fn test_connect_without_url_keeps_bindings() {
		let mut registry = ContractRegistry::<Provider<Http>>::new(bundle(), None);

		// Nothing configured yet
		assert!(matches!(
			registry.connect(None).unwrap_err(),
			RegistryError::Configuration(_)
		));
		assert!(registry.connection().is_none());
		assert!(registry.handles().all(|h| h.provider().is_none()));

		registry.connect(Some("http://localhost:8545")).unwrap();
		let connected = registry.connection().unwrap().clone();

		// A failed reconnect leaves the previous provider in place
		assert!(registry.connect(Some("")).is_err());
		assert!(registry.connect(None).is_err());
		assert!(Arc::ptr_eq(registry.connection().unwrap(), &connected));
		for handle in registry.handles() {
			assert!(Arc::ptr_eq(handle.provider().unwrap(), &connected));
		}
	}

	#[test]
	fn test_resolve_with_network_id() {
		let registry = ContractRegistry::<Mocked>::new(bundle(), None);
		let resolution = registry.resolve_with_network_id("1");

		assert_eq!(resolution.network_id().as_str(), "1");
		assert_eq!(resolution.len(), 2);
		assert_eq!(resolution.get("identityFactory").unwrap().address(), addr(0xaa));
		assert_eq!(resolution.get("uPortRegistry").unwrap().address(), addr(0xdd));

		// No record on the network
		assert!(resolution.get("proxy").is_none());
		// Record with an empty address
		assert!(resolution.get("recoverableController").is_none());
		// Only the normalized name is exposed
		assert!(resolution.get("IdentityFactory").is_none());
	}

	#[test]
	fn test_malformed_address_only_affects_its_network() {
		let bundle = ArtifactBundle::from_json(
			r#"{
				"Foo": { "networks": { "1": { "address": "0x00000000000000000000000000000000000000aa" } } },
				"Bar": { "networks": { "3": { "address": "0xABC" } } }
			}"#,
		)
		.unwrap();
		let mut registry = ContractRegistry::<Mocked>::new(bundle, None);

		registry.bind_network("1");
		assert_eq!(registry.instance("foo").unwrap().address(), addr(0xaa));
		assert!(registry.instance("bar").is_none());

		let resolution = registry.resolve_with_network_id("3");
		assert!(resolution.is_empty());

		registry.apply(resolution);
		assert!(registry.handle("Bar").unwrap().address().is_none());
		assert_eq!(registry.active_network_id(), Some(&NetworkId::from("3")));
	}

	#[test]
	fn test_resolve_does_not_mutate() {
		let registry = ContractRegistry::<Mocked>::new(bundle(), None);
		let _ = registry.resolve_with_network_id("42");

		assert!(registry.active_network_id().is_none());
		assert_eq!(registry.instances().count(), 0);
		assert!(registry.handles().all(|h| h.network_id().is_none()));
	}

	#[test]
	fn test_apply_binds_handles() {
		let mut registry = ContractRegistry::<Mocked>::new(bundle(), None);
		let resolution = registry.resolve_with_network_id("42");
		registry.apply(resolution);

		assert_eq!(registry.active_network_id(), Some(&NetworkId::from("42")));
		for handle in registry.handles() {
			assert_eq!(handle.network_id(), Some(&NetworkId::from("42")));
		}
		assert_eq!(
			registry.handle("RecoverableController").unwrap().address(),
			Some(addr(0xcc))
		);
		assert!(registry.handle("Proxy").unwrap().address().is_none());
		assert_eq!(
			registry.instance("recoverableController").unwrap().address(),
			addr(0xcc)
		);
		assert!(registry.instance("uPortRegistry").is_none());
	}

	#[test]
	fn test_apply_drops_instances_from_previous_network() {
		let mut registry = ContractRegistry::<Mocked>::new(bundle(), None);

		registry.bind_network("1");
		assert!(registry.instance("uPortRegistry").is_some());

		registry.bind_network("42");
		assert!(registry.instance("uPortRegistry").is_none());
		assert!(registry.handle("uPortRegistry").unwrap().address().is_none());
		assert_eq!(registry.instance("identityFactory").unwrap().address(), addr(0xbb));
	}

	#[tokio::test]
	async fn test_resolve_by_querying_without_connection() {
		let registry = ContractRegistry::<Mocked>::new(bundle(), None);

		let err = registry.resolve_by_querying_connection().await.unwrap_err();
		assert!(matches!(err, RegistryError::Configuration(_)));
		assert!(err.to_string().contains("Must configure a connection first"));
		assert!(registry.active_network_id().is_none());
	}

	#[tokio::test]
	async fn test_resolve_by_querying_matches_explicit_id() {
		let (provider, mock) = mocked();
		mock.push::<String, _>("42".to_string()).unwrap();
		let registry = ContractRegistry::new(bundle(), Some(provider));

		let queried = registry.resolve_by_querying_connection().await.unwrap();
		let explicit = registry.resolve_with_network_id("42");

		assert_eq!(queried.network_id(), explicit.network_id());
		assert_eq!(queried.addresses(), explicit.addresses());
	}

	#[tokio::test]
	async fn test_transport_error_is_propagated() {
		let (provider, _mock) = mocked();
		let mut registry = ContractRegistry::new(bundle(), Some(provider));
		registry.bind_network("1");

		// The mock has no queued response, so the query fails
		let err = registry.bind_connected_network().await.unwrap_err();

		assert!(matches!(err, RegistryError::Transport(_)));
		assert!(matches!(
			err.transport_error::<ProviderError>(),
			Some(ProviderError::JsonRpcClientError(_))
		));
		assert_eq!(registry.active_network_id(), Some(&NetworkId::from("1")));
		assert!(registry.instance("uPortRegistry").is_some());
	}

	#[tokio::test]
	async fn test_bind_connected_network() {
		let (provider, mock) = mocked();
		mock.push::<String, _>("1".to_string()).unwrap();
		let mut registry = ContractRegistry::new(bundle(), Some(provider.clone()));

		registry.bind_connected_network().await.unwrap();

		assert_eq!(registry.active_network_id(), Some(&NetworkId::from("1")));
		let instance = registry.instance("identityFactory").unwrap();
		assert_eq!(instance.address(), addr(0xaa));
		assert!(Arc::ptr_eq(instance.provider().unwrap(), &provider));
	}

	#[test]
	fn test_end_to_end() {
		let bundle = ArtifactBundle::from_json(
			r#"{ "Foo": { "networks": { "1": { "address": "0x00000000000000000000000000000000000000aa" } } } }"#,
		)
		.unwrap();
		let (provider, _mock) = mocked();

		let mut registry = ContractRegistry::new(bundle, None);
		registry.set_provider(provider);
		registry.bind_network("1");

		assert_eq!(registry.instance("foo").unwrap().address(), addr(0xaa));
		assert_eq!(registry.active_network_id().unwrap().as_str(), "1");
		assert_eq!(registry.handle("Foo").unwrap().address(), Some(addr(0xaa)));
	}
}
