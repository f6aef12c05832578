mod config;
mod ledger;
mod session;
mod tickets;
mod utils;

use std::sync::Arc;
use tracing::{error, info};

use crate::config::ContractAddresses;
use crate::ledger::HttpLedgerRpc;
use crate::session::{StaticWalletProvider, WalletSession};
use crate::tickets::{NATIVE_TOKEN_DECIMALS, TicketService};
use crate::utils::format_token_amount;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	// Initialize tracing subscriber with debug logging for the session layer
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive("snaptix_session=debug".parse().unwrap())
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting SnapTix session host");

	let gateway_url = std::env::var("SNAPTIX_GATEWAY_URL")
		.unwrap_or_else(|_| "http://localhost:8545".to_string());
	let contracts_path =
		std::env::var("SNAPTIX_CONTRACTS").unwrap_or_else(|_| "contracts.json".to_string());
	let account = match std::env::var("SNAPTIX_ACCOUNT") {
		Ok(account) => account,
		Err(_) => {
			error!("SNAPTIX_ACCOUNT is not set; cannot start a wallet session");
			return;
		}
	};
	let chain_id = std::env::var("SNAPTIX_CHAIN_ID")
		.ok()
		.and_then(|value| value.parse::<u64>().ok())
		.unwrap_or(1);

	let addresses = match ContractAddresses::load(&contracts_path).await {
		Ok(addresses) => addresses,
		Err(e) => {
			error!(
				"Failed to load contract addresses from {}: {}",
				contracts_path, e
			);
			return;
		}
	};

	let rpc = Arc::new(HttpLedgerRpc::new(gateway_url));
	let provider = Arc::new(StaticWalletProvider::new(account, chain_id));

	let session = WalletSession::start(provider, rpc, addresses);

	info!("Created wallet session");

	let identity = match session.connect().await {
		Ok(identity) => identity,
		Err(e) => {
			error!("Failed to connect wallet session: {}", e);
			return;
		}
	};

	info!(
		"Connected as {} on chain {}",
		identity.address, identity.chain_id
	);

	let tickets = TicketService::new(session.clone());

	match tickets.list_tickets().await {
		Ok(owned) => {
			info!("Account owns {} tickets", owned.len());
			for ticket in &owned {
				info!(
					"Ticket {} admits to event {} ({} at {}, {})",
					ticket.token_id,
					ticket.event_id,
					ticket.event.title,
					ticket.event.location,
					ticket.event.date
				);
			}
		}
		Err(e) => {
			error!("Failed to list tickets: {}", e);
		}
	}

	let purchase = std::env::var("SNAPTIX_EVENT_ID")
		.ok()
		.zip(std::env::var("SNAPTIX_PRICE").ok());

	if let Some((event_id, price)) = purchase {
		match (event_id.parse::<u64>(), price.parse::<u128>()) {
			(Ok(event_id), Ok(price)) => {
				info!(
					"Purchasing ticket for event {} at {}",
					event_id,
					format_token_amount(price, NATIVE_TOKEN_DECIMALS)
				);
				match tickets.purchase_ticket(event_id, price).await {
					Ok(receipt) => {
						info!(
							"Purchase confirmed: {} in block {}",
							receipt.transaction_hash, receipt.block_number
						);
					}
					Err(e) => {
						error!("Purchase failed: {}", e);
					}
				}
			}
			_ => {
				error!("SNAPTIX_EVENT_ID and SNAPTIX_PRICE must be integers");
			}
		}
	}

	session.close();
}
