//! Loading artifact bundles from disk.
//!
//! Two layouts are accepted:
//!
//! - a single JSON file mapping contract names to artifacts;
//! - a directory of per-contract JSON files as produced by `truffle compile`
//!   (`build/contracts/<Name>.json`). The contract is registered under the
//!   artifact's `contractName`, or the file stem when it has none.

use crate::ConfigError;
use registry_types::{Artifact, ArtifactBundle};
use std::{
	io,
	path::{Path, PathBuf},
};
use tracing::{debug, info};

pub struct ArtifactLoader;

impl ArtifactLoader {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<ArtifactBundle, ConfigError> {
		let path = path.as_ref();

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}

		let bundle = if path.is_dir() {
			Self::from_dir(path)?
		} else {
			Self::from_bundle_file(path)?
		};

		info!("Loaded {} artifacts from {:?}", bundle.len(), path);
		Ok(bundle)
	}

	pub fn from_bundle_file(path: &Path) -> Result<ArtifactBundle, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		ArtifactBundle::from_json(&contents)
			.map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
	}

	pub fn from_dir(dir: &Path) -> Result<ArtifactBundle, ConfigError> {
		let files = Self::artifact_files(std::fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path())))?;

		let mut bundle = ArtifactBundle::new();

		for file in files {
			let contents = std::fs::read_to_string(&file)?;
			let artifact = Artifact::from_json(&contents)
				.map_err(|e| ConfigError::Parse(format!("{}: {}", file.display(), e)))?;

			let name = match &artifact.contract_name {
				Some(name) => name.clone(),
				None => file
					.file_stem()
					.and_then(|s| s.to_str())
					.map(String::from)
					.ok_or_else(|| {
						ConfigError::Parse(format!("Invalid artifact file name: {:?}", file))
					})?,
			};

			debug!("Loaded artifact {} from {:?}", name, file);

			if bundle.insert(name.clone(), artifact).is_some() {
				return Err(ConfigError::Validation(format!(
					"Duplicate artifact for contract {}",
					name
				)));
			}
		}

		Ok(bundle)
	}

	/// Sorted `.json` files among `entries`. An entry that cannot be read
	/// fails the whole listing.
	fn artifact_files<I>(entries: I) -> io::Result<Vec<PathBuf>>
	where
		I: IntoIterator<Item = io::Result<PathBuf>>,
	{
		let mut files = entries
			.into_iter()
			.filter(|entry| match entry {
				Ok(p) => p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json"),
				Err(_) => true,
			})
			.collect::<io::Result<Vec<_>>>()?;
		files.sort();
		Ok(files)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	const PROXY: &str = r#"{
		"contractName": "Proxy",
		"abi": [],
		"networks": { "3": { "address": "0x00000000000000000000000000000000000000aa" } }
	}"#;

	#[test]
	fn test_load_directory() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("Proxy.json"), PROXY).unwrap();
		fs::write(dir.path().join("Registry.json"), r#"{ "abi": [] }"#).unwrap();
		fs::write(dir.path().join("README.md"), "not an artifact").unwrap();

		let bundle = ArtifactLoader::load(dir.path()).unwrap();

		assert_eq!(bundle.names().collect::<Vec<_>>(), vec!["Proxy", "Registry"]);
		assert!(bundle.get("Proxy").unwrap().deployed_address("3").unwrap().is_some());
	}

	#[test]
	fn test_unreadable_entry_fails_listing() {
		let dir = tempfile::tempdir().unwrap();
		let proxy = dir.path().join("Proxy.json");
		fs::write(&proxy, PROXY).unwrap();

		let entries = vec![
			Ok(proxy.clone()),
			Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
		];
		let err = ArtifactLoader::artifact_files(entries).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

		let files = ArtifactLoader::artifact_files(vec![
			Ok(dir.path().join("Registry.json")),
			Ok(proxy.clone()),
		])
		.unwrap();
		assert_eq!(files, vec![proxy]);
	}

	#[test]
	fn test_contract_name_wins_over_file_stem() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("proxy-v1.json"), PROXY).unwrap();

		let bundle = ArtifactLoader::load(dir.path()).unwrap();
		assert!(bundle.get("Proxy").is_some());
		assert!(bundle.get("proxy-v1").is_none());
	}

	#[test]
	fn test_duplicate_contract_names() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("a.json"), PROXY).unwrap();
		fs::write(dir.path().join("b.json"), PROXY).unwrap();

		let err = ArtifactLoader::load(dir.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_load_bundle_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("uport.json");
		fs::write(&path, format!(r#"{{ "Proxy": {} }}"#, PROXY)).unwrap();

		let bundle = ArtifactLoader::load(&path).unwrap();
		assert_eq!(bundle.len(), 1);
	}

	#[test]
	fn test_invalid_artifact_names_file() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();

		let err = ArtifactLoader::load(dir.path()).unwrap_err();
		assert!(err.to_string().contains("Broken.json"));
	}

	#[test]
	fn test_missing_path() {
		let err = ArtifactLoader::load("/does/not/exist").unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}
}
