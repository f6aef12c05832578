use crate::ledger::{LedgerClient, LedgerError, Receipt, RpcError};
use crate::session::WalletSession;
use crate::tickets::NATIVE_TOKEN_DECIMALS;
use crate::tickets::types::{EventDetails, Ticket, TicketError};
use crate::utils::format_token_amount;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Ticket enumeration and purchase over a session's current registry.
///
/// Every operation snapshots the session state once at its start and runs
/// against that generation's registry; a session that is not connected fails
/// the operation before any ledger read. Operation failures are returned to
/// the caller and never change the session status.
pub struct TicketService {
    session: Arc<WalletSession>,
}

impl TicketService {
    pub fn new(session: Arc<WalletSession>) -> Self {
        Self { session }
    }

    /// Enumerate the tickets owned by the current account.
    ///
    /// Reads the owned-token count, then each owned token by index together
    /// with its event record. The sequence follows the contract's ownership
    /// index (0..count-1); that order is ledger-defined and does not track
    /// purchase time. Each owned token costs its own ledger reads, so a call
    /// is O(n) in the owned-ticket count.
    ///
    /// A failure reading any single token aborts the whole enumeration with
    /// the failing index; no silently partial list is ever returned.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, TicketError> {
        let state = self.session.current_state();
        let Some((identity, registry)) = state.connection() else {
            return Err(TicketError::NotConnected);
        };

        let client = registry.ticket_nft();
        let owner = identity.address.as_str();

        let balance = expect_u64(
            client.call("balanceOf", json!([owner])).await?,
            "balanceOf",
        )?;
        debug!("Account {} owns {} tickets", owner, balance);

        let mut tickets = Vec::with_capacity(balance as usize);
        for index in 0..balance {
            match Self::read_ticket(client, owner, index).await {
                Ok(ticket) => {
                    debug!(
                        "Ticket {} at index {} admits to event {}",
                        ticket.token_id, index, ticket.event_id
                    );
                    tickets.push(ticket);
                }
                Err(source) => {
                    return Err(TicketError::PartialReadFailure { index, source });
                }
            }
        }

        Ok(tickets)
    }

    async fn read_ticket(
        client: &LedgerClient,
        owner: &str,
        index: u64,
    ) -> Result<Ticket, LedgerError> {
        let token_id = expect_u64(
            client
                .call("tokenOfOwnerByIndex", json!([owner, index]))
                .await?,
            "tokenOfOwnerByIndex",
        )?;
        let event_id = expect_u64(
            client.call("ticketToEvent", json!([token_id])).await?,
            "ticketToEvent",
        )?;
        let details = client.call("events", json!([event_id])).await?;
        let event: EventDetails =
            serde_json::from_value(details).map_err(|e| LedgerError::Rpc(RpcError::Json(e)))?;

        Ok(Ticket {
            token_id,
            event_id,
            event,
        })
    }

    /// Purchase a ticket for an event and wait for the confirmed receipt.
    ///
    /// Submits a value-bearing mint against the ticket contract. A contract
    /// rejection (sold out, wrong value, unknown event) returns the revert
    /// reason; transport failures return as ledger errors. Neither touches
    /// the session status.
    ///
    /// No idempotency token is attached to the submission: one call is one
    /// on-chain transaction at most, and a caller that resubmits after a
    /// failure may mint twice unless it checks pending-transaction state
    /// first.
    pub async fn purchase_ticket(
        &self,
        event_id: u64,
        price: u128,
    ) -> Result<Receipt, TicketError> {
        let state = self.session.current_state();
        let Some((identity, registry)) = state.connection() else {
            return Err(TicketError::NotConnected);
        };

        info!(
            "Purchasing ticket for event {} at {} as {}",
            event_id,
            format_token_amount(price, NATIVE_TOKEN_DECIMALS),
            identity.address
        );

        match registry
            .ticket_nft()
            .send("mintTicket", json!([event_id]), price)
            .await
        {
            Ok(receipt) => {
                info!(
                    "Purchase confirmed: {} in block {}",
                    receipt.transaction_hash, receipt.block_number
                );
                Ok(receipt)
            }
            Err(LedgerError::Rpc(RpcError::Reverted(reason))) => {
                Err(TicketError::Reverted(reason))
            }
            Err(other) => Err(TicketError::Ledger(other)),
        }
    }
}

fn expect_u64(value: Value, method: &str) -> Result<u64, LedgerError> {
    value.as_u64().ok_or_else(|| {
        LedgerError::Rpc(RpcError::Gateway(format!(
            "{method} returned a non-integer payload"
        )))
    })
}
