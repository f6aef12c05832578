use super::client::{LedgerClient, LedgerRpc};
use super::types::ContractInterface;
use crate::config::ContractAddresses;
use crate::session::Identity;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Name of the ticket registry contract in the address configuration.
pub const TICKET_NFT: &str = "TicketNFT";
/// Name of the marketplace contract in the address configuration.
pub const TICKET_MARKETPLACE: &str = "TicketMarketplace";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	#[error("contract address not configured: {0}")]
	NotConfigured(String),
}

fn ticket_nft_interface() -> ContractInterface {
	ContractInterface::new(TICKET_NFT)
		.transaction("mintTicket")
		.view("balanceOf")
		.view("tokenOfOwnerByIndex")
		.view("ticketToEvent")
		.view("events")
}

fn marketplace_interface() -> ContractInterface {
	ContractInterface::new(TICKET_MARKETPLACE)
		.transaction("listTicket")
		.transaction("cancelListing")
		.transaction("purchaseListing")
		.view("listings")
}

/// The fixed set of contract clients the application needs, bound to one
/// identity.
///
/// A registry is immutable after construction. When the session identity
/// changes, a new registry is built and the old one is discarded wholesale
/// with its clients, so no client anywhere keeps operating under a
/// previously active account.
#[derive(Debug)]
pub struct ContractRegistry {
	ticket_nft: LedgerClient,
	marketplace: LedgerClient,
}

impl ContractRegistry {
	/// Build clients for every required contract.
	///
	/// The build is atomic: the first contract without a configured address
	/// fails the whole build, naming that contract, and no partial registry
	/// is ever returned.
	pub fn build(
		identity: &Identity,
		addresses: &ContractAddresses,
		rpc: Arc<dyn LedgerRpc>,
	) -> Result<Self, RegistryError> {
		let ticket_nft =
			Self::client_for(TICKET_NFT, ticket_nft_interface(), identity, addresses, &rpc)?;
		let marketplace = Self::client_for(
			TICKET_MARKETPLACE,
			marketplace_interface(),
			identity,
			addresses,
			&rpc,
		)?;

		info!(
			"Built contract registry for {} on chain {}",
			identity.address, identity.chain_id
		);

		Ok(Self {
			ticket_nft,
			marketplace,
		})
	}

	fn client_for(
		name: &'static str,
		interface: ContractInterface,
		identity: &Identity,
		addresses: &ContractAddresses,
		rpc: &Arc<dyn LedgerRpc>,
	) -> Result<LedgerClient, RegistryError> {
		LedgerClient::bind(addresses.contract(name), interface, identity, rpc.clone()).map_err(
			|err| {
				warn!("Failed to bind {}: {}", name, err);
				RegistryError::NotConfigured(name.to_string())
			},
		)
	}

	/// Client for the ticket registry contract.
	pub fn ticket_nft(&self) -> &LedgerClient {
		&self.ticket_nft
	}

	/// Client for the marketplace contract.
	pub fn marketplace(&self) -> &LedgerClient {
		&self.marketplace
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::types::{Receipt, RpcError};
	use crate::session::SigningHandle;
	use serde_json::Value;

	struct NullRpc;

	#[async_trait::async_trait]
	impl LedgerRpc for NullRpc {
		async fn call(
			&self,
			_contract: &str,
			_method: &str,
			_args: Value,
		) -> Result<Value, RpcError> {
			Err(RpcError::NoData)
		}

		async fn send(
			&self,
			_contract: &str,
			_method: &str,
			_args: Value,
			_value: u128,
			_signer: &SigningHandle,
		) -> Result<Receipt, RpcError> {
			Err(RpcError::NoData)
		}
	}

	fn identity() -> Identity {
		Identity {
			address: "tkt1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7rusq5e3r0d".to_string(),
			chain_id: 1,
			signer: None,
		}
	}

	#[test]
	fn build_fails_atomically_when_an_address_is_missing() {
		let addresses = ContractAddresses::from_entries([(
			TICKET_NFT.to_string(),
			"tkt1nftaddress".to_string(),
		)]);

		let result = ContractRegistry::build(&identity(), &addresses, Arc::new(NullRpc));
		assert_eq!(
			result.err(),
			Some(RegistryError::NotConfigured(TICKET_MARKETPLACE.to_string()))
		);
	}

	#[test]
	fn build_fails_on_empty_address_entry() {
		let addresses = ContractAddresses::from_entries([
			(TICKET_NFT.to_string(), String::new()),
			(TICKET_MARKETPLACE.to_string(), "tkt1market".to_string()),
		]);

		let result = ContractRegistry::build(&identity(), &addresses, Arc::new(NullRpc));
		assert_eq!(
			result.err(),
			Some(RegistryError::NotConfigured(TICKET_NFT.to_string()))
		);
	}

	#[test]
	fn build_binds_every_required_contract() {
		let addresses = ContractAddresses::from_entries([
			(TICKET_NFT.to_string(), "tkt1nftaddress".to_string()),
			(TICKET_MARKETPLACE.to_string(), "tkt1market".to_string()),
		]);

		let registry = ContractRegistry::build(&identity(), &addresses, Arc::new(NullRpc))
			.expect("build failed");
		assert_eq!(registry.ticket_nft().contract_name(), TICKET_NFT);
		assert_eq!(registry.ticket_nft().contract_address(), "tkt1nftaddress");
		assert_eq!(registry.marketplace().contract_name(), TICKET_MARKETPLACE);
	}
}
