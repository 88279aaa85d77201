//! Network identifiers.

use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, convert::Infallible, fmt, str::FromStr};

/// Identifier of a blockchain network as reported by `net_version`.
///
/// Artifacts key their deployment records by this value, so it is kept as the
/// raw string rather than parsed into a number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub String);

impl NetworkId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NetworkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for NetworkId {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(s.to_string()))
	}
}

impl From<&str> for NetworkId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for NetworkId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<u64> for NetworkId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

impl Borrow<str> for NetworkId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
