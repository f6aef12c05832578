//! Wallet session lifecycle and connection state machine.
//!
//! This module defines `WalletSession`, which owns the connection to the
//! injected wallet capability and republishes session state to dependents.
//! The session is responsible for:
//! - Requesting wallet authorization and deriving the active identity
//! - Rebuilding the contract registry whenever that identity changes
//! - Consuming wallet change notifications strictly in arrival order
//! - Discarding results of superseded work, so the state dependents observe
//!   is always bound to the most recently reported account
//!
//! Identity-affecting work claims an epoch from a monotonic counter before
//! its first suspension point and may only publish while that epoch is still
//! the newest one. A rebuild triggered by a later notification therefore
//! always wins, even when an earlier rebuild's async work finishes after it.

use crate::config::ContractAddresses;
use crate::ledger::{AccountAddress, ContractRegistry, LedgerRpc, RegistryError};
use crate::session::provider::{WalletEvent, WalletEventStream, WalletProvider};
use crate::session::state::{Identity, SessionError, SessionState};
use futures_util::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owner of the wallet connection lifecycle.
///
/// Holds the injected wallet capability, the gateway transport and the
/// contract address configuration, and publishes every state transition
/// wholesale through a watch channel. Dependents subscribe once and read
/// consistent generations; no field of a published state is ever mutated in
/// place.
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    rpc: Arc<dyn LedgerRpc>,
    addresses: ContractAddresses,
    /// Monotonic counter; the newest claimed epoch is the only one allowed
    /// to publish.
    epoch: AtomicU64,
    /// Epoch of the most recently published state.
    last_published: Mutex<u64>,
    state_tx: watch::Sender<Arc<SessionState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl WalletSession {
    /// Start a session against the given wallet capability.
    ///
    /// The session begins `Initializing`. Without a wallet capability in the
    /// environment it settles `Disconnected` immediately; absence of a
    /// wallet is an expected condition, not a failure. With one, a listener
    /// task starts draining the wallet's notification stream, one event
    /// fully handled before the next is read.
    pub fn start(
        provider: Arc<dyn WalletProvider>,
        rpc: Arc<dyn LedgerRpc>,
        addresses: ContractAddresses,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(Arc::new(SessionState::initializing()));

        let session = Arc::new(Self {
            provider,
            rpc,
            addresses,
            epoch: AtomicU64::new(0),
            last_published: Mutex::new(0),
            state_tx,
            listener: Mutex::new(None),
        });

        if !session.provider.is_available() {
            info!("No wallet capability available, session starts disconnected");
            session
                .state_tx
                .send_replace(Arc::new(SessionState::disconnected()));
            return session;
        }

        let events = session.provider.subscribe();
        let weak = Arc::downgrade(&session);
        let handle = tokio::spawn(Self::drain_events(weak, events));
        *session.listener.lock().unwrap() = Some(handle);

        session
    }

    /// Request wallet authorization and establish a connected identity.
    ///
    /// On success the session publishes `Connected` with a freshly built
    /// registry, superseding any prior `Failed` status. A rejected
    /// authorization publishes `Failed` and discards any previous
    /// connection; dependents never keep observing a stale identity after a
    /// failed reconnect.
    pub async fn connect(&self) -> Result<Identity, SessionError> {
        if !self.provider.is_available() {
            return Err(SessionError::NoWalletAvailable);
        }

        let epoch = self.claim_epoch();

        let accounts = match self.provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                let error = SessionError::AuthorizationRejected(err.to_string());
                self.publish_if_current(epoch, SessionState::failed(error.clone()));
                return Err(error);
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            let error =
                SessionError::AuthorizationRejected("wallet returned no accounts".to_string());
            self.publish_if_current(epoch, SessionState::failed(error.clone()));
            return Err(error);
        };

        self.establish(epoch, account).await
    }

    /// Derive the identity for an account and rebuild the registry for it.
    ///
    /// Shared by connect and account-change handling; the caller has already
    /// claimed the epoch this work publishes under.
    async fn establish(&self, epoch: u64, account: String) -> Result<Identity, SessionError> {
        let address = match AccountAddress::decode(&account) {
            Ok(parsed) => parsed.encode(),
            Err(err) => {
                let error = SessionError::InvalidAccount(format!("{account}: {err}"));
                self.publish_if_current(epoch, SessionState::failed(error.clone()));
                return Err(error);
            }
        };

        let chain_id = match self.provider.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(err) => {
                let error = SessionError::Provider(err.to_string());
                self.publish_if_current(epoch, SessionState::failed(error.clone()));
                return Err(error);
            }
        };

        let signer = match self.provider.signing_handle(&address).await {
            Ok(signer) => signer,
            Err(err) => {
                let error = SessionError::Provider(err.to_string());
                self.publish_if_current(epoch, SessionState::failed(error.clone()));
                return Err(error);
            }
        };

        let identity = Identity {
            address,
            chain_id,
            signer,
        };

        match ContractRegistry::build(&identity, &self.addresses, self.rpc.clone()) {
            Ok(registry) => {
                info!(
                    "Session connected as {} on chain {}",
                    identity.address, identity.chain_id
                );
                self.publish_if_current(
                    epoch,
                    SessionState::connected(identity.clone(), Arc::new(registry)),
                );
                Ok(identity)
            }
            Err(RegistryError::NotConfigured(name)) => {
                let error = SessionError::ContractsNotConfigured(name);
                // The identity stays observable so diagnostics can show the
                // account resolved while configuration is absent.
                self.publish_if_current(
                    epoch,
                    SessionState::failed_with_identity(identity, error.clone()),
                );
                Err(error)
            }
        }
    }

    /// Stop consuming wallet notifications.
    ///
    /// Idempotent; safe to call repeatedly or on a session that never
    /// connected. In-flight work is allowed to finish but can no longer
    /// publish, because closing claims the newest epoch.
    pub fn close(&self) {
        self.claim_epoch();
        if let Some(handle) = self.listener.lock().unwrap().take() {
            handle.abort();
            debug!("Wallet session listener stopped");
        }
    }

    /// Subscribe to session state generations.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the latest published state.
    pub fn current_state(&self) -> Arc<SessionState> {
        self.state_tx.borrow().clone()
    }

    async fn drain_events(session: Weak<WalletSession>, mut events: WalletEventStream) {
        while let Some(event) = events.next().await {
            let Some(session) = session.upgrade() else {
                break;
            };
            match event {
                WalletEvent::AccountsChanged(accounts) => {
                    session.handle_accounts_changed(accounts).await;
                }
                WalletEvent::ChainChanged(chain_id) => {
                    session.handle_chain_changed(chain_id);
                }
            }
        }
        debug!("Wallet notification stream ended");
    }

    async fn handle_accounts_changed(&self, accounts: Vec<String>) {
        let epoch = self.claim_epoch();

        match accounts.into_iter().next() {
            None => {
                info!("Wallet reports no accounts, session disconnected");
                self.publish_if_current(epoch, SessionState::disconnected());
            }
            Some(account) => {
                debug!("Wallet account changed, rebinding session to {}", account);
                if let Err(err) = self.establish(epoch, account).await {
                    warn!("Failed to rebind session after account change: {}", err);
                }
            }
        }
    }

    /// Contract addresses are network-specific and the session carries no
    /// per-network configuration, so a network switch invalidates the whole
    /// session rather than continuing against a mismatched registry. The
    /// host decides what a reconnect means.
    fn handle_chain_changed(&self, chain_id: u64) {
        let epoch = self.claim_epoch();
        info!(
            "Wallet network changed to chain {}, session requires reconnect",
            chain_id
        );
        self.publish_if_current(epoch, SessionState::initializing());
    }

    fn claim_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a state generation unless the claiming epoch went stale.
    ///
    /// A state may only land while its epoch is still the newest claimed
    /// one, and never after a newer generation was already published.
    fn publish_if_current(&self, epoch: u64, state: SessionState) -> bool {
        let mut last = self.last_published.lock().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch || *last > epoch {
            debug!("Discarding superseded session state from epoch {}", epoch);
            return false;
        }
        *last = epoch;
        self.state_tx.send_replace(Arc::new(state));
        true
    }
}
