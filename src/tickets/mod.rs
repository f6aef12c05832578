//! Ticket data-access layer
//!
//! Enumerates a user's tickets and submits purchases through the wallet
//! session's current contract registry. Tickets are read-only projections of
//! on-chain state and are re-fetched on every enumeration; the ledger stays
//! the single source of truth.

/// Ticket enumeration and purchase service
pub mod service;
/// Ticket and event type definitions
pub mod types;

pub use service::TicketService;
pub use types::*;

/// Number of decimal places of the ledger's native token.
pub const NATIVE_TOKEN_DECIMALS: u32 = 18;
