//! Wallet Session Module
//!
//! This module owns the connection between the application and the injected
//! wallet capability. It is composed of three submodules:
//!
//! - `provider`: the wallet capability trait, its notification stream, and a
//!   static implementation for hosts without an interactive wallet.
//! - `state`: the identity and session-state records dependents observe.
//! - `lifecycle`: the `WalletSession` state machine, which authorizes the
//!   wallet, rebuilds the contract registry on every identity change, and
//!   republishes consistent state generations to dependents.
//!
//! The session is the only writer of session state; dependents read
//! generations through a watch subscription and never mutate them.

/// Connection lifecycle state machine
pub mod lifecycle;
/// Injected wallet capability and notifications
pub mod provider;
/// Session state records
pub mod state;

pub use lifecycle::WalletSession;
pub use provider::{
    ProviderError, StaticWalletProvider, WalletEvent, WalletEventSink, WalletEventStream,
    WalletProvider, generate_session_token,
};
pub use state::*;
