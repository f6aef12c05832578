//! Contract address configuration.
//!
//! Deployed contract addresses are loaded once at process start from a JSON
//! file (the same flat name-to-address object the deployment tooling writes)
//! and are immutable for the process lifetime. A contract missing from the
//! file is a configuration error for that contract only: its address comes
//! back empty and client construction for it fails, without affecting other
//! contracts or the process.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read contract configuration: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse contract configuration: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Name and deployed address of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
	pub name: String,
	pub address: String,
}

/// Immutable mapping of contract name to deployed address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractAddresses {
	#[serde(flatten)]
	entries: HashMap<String, String>,
}

impl ContractAddresses {
	/// Load the address mapping from a JSON file.
	pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await?;
		let addresses: ContractAddresses = serde_json::from_str(&content)?;

		info!(
			"Loaded {} contract addresses from {:?}",
			addresses.entries.len(),
			path
		);
		Ok(addresses)
	}

	/// Build a mapping directly, for hosts that carry addresses in their own
	/// configuration instead of a file.
	pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
		Self {
			entries: entries.into_iter().collect(),
		}
	}

	/// Look up the configuration for one contract.
	///
	/// An absent entry yields an empty address; callers that require the
	/// contract treat that as unconfigured.
	pub fn contract(&self, name: &str) -> ContractConfig {
		ContractConfig {
			name: name.to_string(),
			address: self.entries.get(name).cloned().unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_entry_yields_empty_address() {
		let addresses = ContractAddresses::from_entries([(
			"TicketNFT".to_string(),
			"tkt1qqqsyrhqy2a".to_string(),
		)]);

		assert_eq!(addresses.contract("TicketNFT").address, "tkt1qqqsyrhqy2a");
		let missing = addresses.contract("TicketMarketplace");
		assert_eq!(missing.name, "TicketMarketplace");
		assert!(missing.address.is_empty());
	}

	#[tokio::test]
	async fn loads_flat_json_object() {
		let path = std::env::temp_dir().join(format!(
			"snaptix-contracts-{}.json",
			std::process::id()
		));
		std::fs::write(
			&path,
			r#"{"TicketNFT": "tkt1aaa", "TicketMarketplace": "tkt1bbb"}"#,
		)
		.expect("failed to write fixture");

		let addresses = ContractAddresses::load(&path)
			.await
			.expect("failed to load fixture");
		assert_eq!(addresses.contract("TicketNFT").address, "tkt1aaa");
		assert_eq!(addresses.contract("TicketMarketplace").address, "tkt1bbb");

		let _ = std::fs::remove_file(&path);
	}
}
