//!
//! Gateway transport and typed contract clients for the ticketing ledger.
//!
//! This module provides the async transport seam (`LedgerRpc`), its HTTP
//! implementation against the ledger gateway, and `LedgerClient`, the typed
//! handle binding one contract's callable schema to a signing identity. All
//! methods are async and designed for use with Tokio. No retries happen at
//! this layer; callers that want resilience own that decision.

use super::types::{ContractInterface, LedgerError, MethodKind, Receipt, RpcError};
use crate::config::ContractConfig;
use crate::session::{Identity, SigningHandle};
use reqwest::Client;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How often the gateway is polled for a confirmation receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How many polls before a submission counts as unconfirmed.
const RECEIPT_POLL_ATTEMPTS: u32 = 30;

/// Transport for read and write calls against ledger contracts.
#[async_trait::async_trait]
pub trait LedgerRpc: Send + Sync {
	/// Execute a read-only call against a contract.
	async fn call(&self, contract: &str, method: &str, args: Value) -> Result<Value, RpcError>;

	/// Submit a value-bearing transaction and wait for its confirmation.
	async fn send(
		&self,
		contract: &str,
		method: &str,
		args: Value,
		value: u128,
		signer: &SigningHandle,
	) -> Result<Receipt, RpcError>;
}

/// HTTP client for the ledger gateway
pub struct HttpLedgerRpc {
	/// The underlying HTTP client for gateway requests.
	http_client: Client,
	/// The base URL of the gateway endpoint.
	gateway_url: String,
}

impl HttpLedgerRpc {
	/// Create a new gateway client.
	///
	/// # Arguments
	/// * `gateway_url` - The HTTP endpoint of the ledger gateway.
	///
	/// # Returns
	/// A new `HttpLedgerRpc` instance.
	pub fn new(gateway_url: String) -> Self {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.expect("Failed to create HTTP client");

		Self {
			http_client,
			gateway_url,
		}
	}

	/// Execute one gateway request.
	///
	/// # Arguments
	/// * `body` - The JSON request body.
	///
	/// # Returns
	/// The `result` payload of the response, or an `RpcError` if the request
	/// fails or the gateway reports an error. A gateway error flagged as
	/// `reverted` surfaces as `RpcError::Reverted` with the revert reason.
	async fn execute(&self, body: Value) -> Result<Value, RpcError> {
		let response = self
			.http_client
			.post(&self.gateway_url)
			.header("Content-Type", "application/json")
			.json(&body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RpcError::Gateway(format!(
				"HTTP error: {}",
				response.status()
			)));
		}

		let response_json: Value = response.json().await?;

		if let Some(error) = response_json.get("error") {
			let message = error
				.get("message")
				.and_then(|m| m.as_str())
				.unwrap_or("unknown gateway error")
				.to_string();
			if error
				.get("reverted")
				.and_then(|r| r.as_bool())
				.unwrap_or(false)
			{
				return Err(RpcError::Reverted(message));
			}
			return Err(RpcError::Gateway(message));
		}

		response_json
			.get("result")
			.cloned()
			.ok_or(RpcError::NoData)
	}
}

#[async_trait::async_trait]
impl LedgerRpc for HttpLedgerRpc {
	async fn call(&self, contract: &str, method: &str, args: Value) -> Result<Value, RpcError> {
		debug!("Calling {} on contract {}", method, contract);

		self.execute(json!({
			"kind": "call",
			"contract": contract,
			"method": method,
			"args": args,
		}))
		.await
	}

	async fn send(
		&self,
		contract: &str,
		method: &str,
		args: Value,
		value: u128,
		signer: &SigningHandle,
	) -> Result<Receipt, RpcError> {
		// Value amounts travel as decimal strings; u128 does not fit a JSON number.
		let submission = self
			.execute(json!({
				"kind": "submit",
				"contract": contract,
				"method": method,
				"args": args,
				"value": value.to_string(),
				"authorization": signer.authorization(),
			}))
			.await?;

		let tx_hash = submission
			.get("transactionHash")
			.and_then(|h| h.as_str())
			.ok_or(RpcError::NoData)?
			.to_string();

		log::info!("Submitted {} to {}: {}", method, contract, tx_hash);

		for attempt in 1..=RECEIPT_POLL_ATTEMPTS {
			let result = self
				.execute(json!({
					"kind": "receipt",
					"hash": tx_hash,
				}))
				.await?;

			if result.is_null() {
				log::debug!(
					"No receipt for {} yet (attempt {}/{})",
					tx_hash,
					attempt,
					RECEIPT_POLL_ATTEMPTS
				);
				tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
				continue;
			}

			if result.get("status").and_then(|s| s.as_str()) == Some("reverted") {
				let reason = result
					.get("reason")
					.and_then(|r| r.as_str())
					.unwrap_or("execution reverted")
					.to_string();
				return Err(RpcError::Reverted(reason));
			}

			let receipt: Receipt = serde_json::from_value(result)?;
			log::info!(
				"Transaction {} confirmed in block {}",
				receipt.transaction_hash,
				receipt.block_number
			);
			return Ok(receipt);
		}

		Err(RpcError::ConfirmationTimeout(tx_hash))
	}
}

/// Typed handle binding one contract's callable schema to an identity.
///
/// A client is owned by the registry that created it and is discarded with
/// that registry whenever the session identity changes; it never migrates to
/// a new identity. Mutability and authorization are checked against the
/// schema before anything reaches the transport.
pub struct LedgerClient {
	config: ContractConfig,
	interface: ContractInterface,
	identity: Identity,
	rpc: Arc<dyn LedgerRpc>,
}

impl LedgerClient {
	/// Bind a contract's schema to a signing identity.
	///
	/// Fails with `LedgerError::MissingAddress` if the configuration carries
	/// no deployed address for the contract.
	pub fn bind(
		config: ContractConfig,
		interface: ContractInterface,
		identity: &Identity,
		rpc: Arc<dyn LedgerRpc>,
	) -> Result<Self, LedgerError> {
		if config.address.is_empty() {
			return Err(LedgerError::MissingAddress(config.name));
		}

		Ok(Self {
			config,
			interface,
			identity: identity.clone(),
			rpc,
		})
	}

	pub fn contract_name(&self) -> &str {
		&self.config.name
	}

	pub fn contract_address(&self) -> &str {
		&self.config.address
	}

	/// Execute a read-only method.
	///
	/// Read calls need no signing capability. A method outside the schema
	/// fails with `UnknownMethod`; a state-mutating method fails with
	/// `StateMutating` without reaching the transport.
	pub async fn call(&self, method: &str, args: Value) -> Result<Value, LedgerError> {
		match self.interface.kind_of(method) {
			None => Err(LedgerError::UnknownMethod(method.to_string())),
			Some(MethodKind::Transaction) => Err(LedgerError::StateMutating(method.to_string())),
			Some(MethodKind::View) => {
				Ok(self.rpc.call(&self.config.address, method, args).await?)
			}
		}
	}

	/// Submit a state-mutating method as a value-bearing transaction and
	/// wait for its confirmation.
	///
	/// Fails with `Unauthorized` if the bound identity has no signing
	/// capability. No retry is performed here; a caller that resubmits after
	/// a transport failure risks a duplicate on-chain transaction.
	pub async fn send(
		&self,
		method: &str,
		args: Value,
		value: u128,
	) -> Result<Receipt, LedgerError> {
		match self.interface.kind_of(method) {
			None => return Err(LedgerError::UnknownMethod(method.to_string())),
			Some(MethodKind::View) => return Err(LedgerError::ReadOnly(method.to_string())),
			Some(MethodKind::Transaction) => {}
		}

		let signer = self
			.identity
			.signer
			.as_ref()
			.ok_or(LedgerError::Unauthorized)?;

		log::debug!(
			"Sending {} to {} ({}) with value {}",
			method,
			self.config.name,
			self.config.address,
			value
		);

		Ok(self
			.rpc
			.send(&self.config.address, method, args, value, signer)
			.await?)
	}
}

impl fmt::Debug for LedgerClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LedgerClient")
			.field("contract", &self.config.name)
			.field("address", &self.config.address)
			.field("account", &self.identity.address)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::types::MethodKind;
	use std::sync::Mutex;

	struct RecordingRpc {
		calls: Mutex<Vec<String>>,
	}

	impl RecordingRpc {
		fn new() -> Arc<Self> {
			Arc::new(Self {
				calls: Mutex::new(Vec::new()),
			})
		}

		fn recorded(&self) -> Vec<String> {
			self.calls.lock().unwrap().clone()
		}
	}

	#[async_trait::async_trait]
	impl LedgerRpc for RecordingRpc {
		async fn call(
			&self,
			_contract: &str,
			method: &str,
			_args: Value,
		) -> Result<Value, RpcError> {
			self.calls.lock().unwrap().push(method.to_string());
			Ok(json!(0))
		}

		async fn send(
			&self,
			_contract: &str,
			method: &str,
			_args: Value,
			_value: u128,
			_signer: &SigningHandle,
		) -> Result<Receipt, RpcError> {
			self.calls.lock().unwrap().push(method.to_string());
			Ok(Receipt {
				transaction_hash: "0xabc".to_string(),
				block_number: 1,
			})
		}
	}

	fn interface() -> ContractInterface {
		ContractInterface::new("TicketNFT")
			.transaction("mintTicket")
			.view("balanceOf")
	}

	fn identity(signer: Option<SigningHandle>) -> Identity {
		Identity {
			address: "tkt1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7rusq5e3r0d".to_string(),
			chain_id: 1,
			signer,
		}
	}

	fn signer() -> SigningHandle {
		SigningHandle::new("tkt1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5z5tpwxqergd3c8g7rusq5e3r0d", "token")
	}

	fn client(rpc: Arc<RecordingRpc>, signer: Option<SigningHandle>) -> LedgerClient {
		LedgerClient::bind(
			ContractConfig {
				name: "TicketNFT".to_string(),
				address: "tkt1nftaddress".to_string(),
			},
			interface(),
			&identity(signer),
			rpc,
		)
		.expect("failed to bind client")
	}

	#[test]
	fn bind_fails_on_empty_address() {
		let rpc = RecordingRpc::new();
		let result = LedgerClient::bind(
			ContractConfig {
				name: "TicketNFT".to_string(),
				address: String::new(),
			},
			interface(),
			&identity(Some(signer())),
			rpc,
		);
		assert!(
			matches!(result, Err(LedgerError::MissingAddress(name)) if name == "TicketNFT")
		);
	}

	#[tokio::test]
	async fn call_rejects_methods_outside_the_interface() {
		let rpc = RecordingRpc::new();
		let client = client(rpc.clone(), Some(signer()));

		let result = client.call("burn", json!([])).await;
		assert!(matches!(result, Err(LedgerError::UnknownMethod(name)) if name == "burn"));
		assert!(rpc.recorded().is_empty());
	}

	#[tokio::test]
	async fn call_rejects_state_mutating_methods() {
		let rpc = RecordingRpc::new();
		let client = client(rpc.clone(), Some(signer()));

		let result = client.call("mintTicket", json!([1])).await;
		assert!(matches!(result, Err(LedgerError::StateMutating(_))));
		assert!(rpc.recorded().is_empty());
	}

	#[tokio::test]
	async fn send_rejects_view_methods() {
		let rpc = RecordingRpc::new();
		let client = client(rpc.clone(), Some(signer()));

		let result = client.send("balanceOf", json!([]), 0).await;
		assert!(matches!(result, Err(LedgerError::ReadOnly(_))));
		assert!(rpc.recorded().is_empty());
	}

	#[tokio::test]
	async fn send_requires_signing_capability() {
		let rpc = RecordingRpc::new();
		let client = client(rpc.clone(), None);

		let result = client.send("mintTicket", json!([1]), 100).await;
		assert!(matches!(result, Err(LedgerError::Unauthorized)));
		assert!(rpc.recorded().is_empty());
	}

	#[tokio::test]
	async fn routed_calls_reach_the_transport() {
		let rpc = RecordingRpc::new();
		let client = client(rpc.clone(), Some(signer()));

		client
			.call("balanceOf", json!(["tkt1owner"]))
			.await
			.expect("view call failed");
		client
			.send("mintTicket", json!([1]), 100)
			.await
			.expect("transaction failed");
		assert_eq!(rpc.recorded(), vec!["balanceOf", "mintTicket"]);
	}

	#[test]
	fn interface_fixture_reports_kinds() {
		assert_eq!(
			interface().kind_of("mintTicket"),
			Some(MethodKind::Transaction)
		);
	}
}
