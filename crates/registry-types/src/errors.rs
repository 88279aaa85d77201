//! Error types for the contract registry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// Error raised by the connection while querying it. The original value
	/// is kept untouched and is reachable through `source()`.
	#[error("Transport error: {0}")]
	Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("Contract {contract} has no deployed address on network {network}")]
	NotDeployed { contract: String, network: String },

	#[error("Unknown contract: {0}")]
	UnknownContract(String),

	#[error("Artifact error: {0}")]
	Artifact(String),
}

impl RegistryError {
	/// Wraps a transport error without translating it.
	pub fn transport<E>(error: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self::Transport(Box::new(error))
	}

	/// Returns the transport error as its concrete type, if it is one.
	pub fn transport_error<E>(&self) -> Option<&E>
	where
		E: std::error::Error + 'static,
	{
		match self {
			Self::Transport(inner) => inner.downcast_ref::<E>(),
			_ => None,
		}
	}
}
