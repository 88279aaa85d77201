//! Shared types for the contract registry.
//!
//! Artifacts and their per-network deployment records are read-only inputs;
//! everything that binds them to a provider lives in `registry-core`.

pub mod artifact;
pub mod errors;
pub mod naming;
pub mod network;

pub use artifact::{Artifact, ArtifactBundle, NetworkRecord};
pub use errors::{RegistryError, Result};
pub use naming::normalize_name;
pub use network::NetworkId;
