//! Binds a bundle of contract artifacts to a connection and resolves their
//! deployed addresses for the connected network.
//!
//! The usual sequence is: build a [`ContractRegistry`] from an
//! [`ArtifactBundle`](registry_types::ArtifactBundle), give it a provider,
//! resolve deployments (either for a known network id or by asking the
//! provider), then apply the [`ResolutionResult`] and use the instances.
//!
//! ```ignore
//! let mut registry = ContractRegistry::new(bundle, None);
//! registry.connect(Some("http://localhost:8545"))?;
//! let resolution = registry.resolve_by_querying_connection().await?;
//! registry.apply(resolution);
//! let factory = registry.instance("identityFactory").unwrap().contract()?;
//! ```

pub mod connection;
pub mod handle;
pub mod registry;
pub mod resolution;

pub use connection::http_provider;
pub use handle::{ContractHandle, DeployedContract};
pub use registry::ContractRegistry;
pub use resolution::ResolutionResult;
