//! Ledger access layer for the SnapTix contracts
//!
//! This module provides the transport and the typed contract clients used to
//! read from and write to the on-chain ticketing contracts. The registry
//! turns a session identity into the fixed set of clients the application
//! needs; the clients check the contract schema and signing authorization
//! before anything reaches the gateway.

/// Account address encoding and validation
pub mod address;
/// Gateway transport and typed contract clients
pub mod client;
/// The fixed contract set bound to one identity
pub mod registry;
/// Type definitions for the ledger access layer
pub mod types;

pub use address::{AccountAddress, AddressError};
pub use client::{HttpLedgerRpc, LedgerClient, LedgerRpc};
pub use registry::{ContractRegistry, RegistryError, TICKET_MARKETPLACE, TICKET_NFT};
pub use types::*;
