//! Compiled contract artifacts and their per-network deployment records.
//!
//! The layout follows the Truffle build output: a JSON object with the
//! contract `abi` and a `networks` map keyed by network id. Keys this crate
//! does not use (`sourceMap`, `ast`, `compiler`, ...) are ignored.

use crate::{errors::RegistryError, network::NetworkId};
use ethers::{abi::Abi, types::Address};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
	collections::{btree_map, BTreeMap},
	str::FromStr,
};

/// Immutable compiled-contract descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	/// Name declared by the compiler, if the artifact carries one.
	#[serde(default)]
	pub contract_name: Option<String>,
	#[serde(default)]
	pub abi: Abi,
	/// Creation bytecode. Kept verbatim since unlinked bytecode contains
	/// library placeholders that are not valid hex.
	#[serde(default)]
	pub bytecode: Option<String>,
	#[serde(default)]
	pub networks: BTreeMap<NetworkId, NetworkRecord>,
}

impl Artifact {
	/// Parses a single artifact from its JSON form.
	pub fn from_json(json: &str) -> Result<Self, RegistryError> {
		serde_json::from_str(json).map_err(|e| RegistryError::Artifact(e.to_string()))
	}

	/// Returns true if the artifact declares a record for `network_id`, with
	/// or without an address.
	pub fn has_network(&self, network_id: &str) -> bool {
		self.networks.contains_key(network_id)
	}

	/// Address deployed on `network_id`, if the record exists and is non-empty.
	///
	/// Addresses are parsed on lookup, so a malformed record only affects the
	/// network it belongs to.
	///
	/// # Errors
	///
	/// Returns `RegistryError::Artifact` if the record's address is not a
	/// 20-byte hex string.
	pub fn deployed_address(&self, network_id: &str) -> Result<Option<Address>, RegistryError> {
		let Some(record) = self.networks.get(network_id) else {
			return Ok(None);
		};

		record.parse_address().map_err(|raw| {
			RegistryError::Artifact(format!("Invalid address: {} on network {}", raw, network_id))
		})
	}
}

/// Deployment record of an artifact on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
	/// Address as written by the build tool. `None` when the record is
	/// present but carries no address.
	#[serde(default, deserialize_with = "deserialize_optional_address")]
	pub address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transaction_hash: Option<String>,
}

impl NetworkRecord {
	/// Parses the recorded address. On failure the raw text is returned.
	pub fn parse_address(&self) -> Result<Option<Address>, &str> {
		self.address
			.as_deref()
			.map(|raw| Address::from_str(raw).map_err(|_| raw))
			.transpose()
	}
}

/// Treats a missing, null or blank address as "not deployed".
fn deserialize_optional_address<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	Ok(raw
		.map(|address| address.trim().to_string())
		.filter(|address| !address.is_empty()))
}

/// Artifacts keyed by contract name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ArtifactBundle {
	artifacts: BTreeMap<String, Artifact>,
}

impl ArtifactBundle {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a bundle of the form `{ "ContractName": { ...artifact... }, ... }`.
	pub fn from_json(json: &str) -> Result<Self, RegistryError> {
		serde_json::from_str(json).map_err(|e| RegistryError::Artifact(e.to_string()))
	}

	/// Adds an artifact, replacing any previous one with the same name.
	pub fn insert(&mut self, name: impl Into<String>, artifact: Artifact) -> Option<Artifact> {
		self.artifacts.insert(name.into(), artifact)
	}

	pub fn get(&self, name: &str) -> Option<&Artifact> {
		self.artifacts.get(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.artifacts.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
		self.artifacts.iter().map(|(name, artifact)| (name.as_str(), artifact))
	}

	pub fn len(&self) -> usize {
		self.artifacts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.artifacts.is_empty()
	}
}

impl IntoIterator for ArtifactBundle {
	type Item = (String, Artifact);
	type IntoIter = btree_map::IntoIter<String, Artifact>;

	fn into_iter(self) -> Self::IntoIter {
		self.artifacts.into_iter()
	}
}

impl FromIterator<(String, Artifact)> for ArtifactBundle {
	fn from_iter<I: IntoIterator<Item = (String, Artifact)>>(iter: I) -> Self {
		Self {
			artifacts: iter.into_iter().collect(),
		}
	}
}
