use super::state::SigningHandle;
use rand::Rng;
use std::pin::Pin;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// Notifications the wallet environment pushes to its sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
	/// The authorized account set changed; an empty list means the wallet
	/// no longer exposes any account.
	AccountsChanged(Vec<String>),
	/// The wallet switched to a different network.
	ChainChanged(u64),
}

/// Stream of wallet notifications, in the order the environment emits them.
pub type WalletEventStream =
	Pin<Box<dyn futures_util::Stream<Item = WalletEvent> + Send>>;

/// Error types for wallet provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("wallet capability is not available")]
	Unavailable,

	#[error("authorization rejected: {0}")]
	Rejected(String),

	#[error("wallet provider error: {0}")]
	Provider(String),
}

/// The wallet capability a host injects into a session.
///
/// Everything the session knows about the wallet flows through this trait:
/// availability, account authorization, the active network, signing
/// capabilities and change notifications. Hosts provide their own
/// implementation; tests provide scripted doubles.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
	/// Whether a wallet capability exists in this environment at all.
	fn is_available(&self) -> bool;

	/// Ask the wallet to authorize account access.
	///
	/// The first returned account is the active one.
	async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

	/// The network the wallet is currently on.
	async fn chain_id(&self) -> Result<u64, ProviderError>;

	/// Signing capability for an authorized account.
	///
	/// `Ok(None)` marks a watch-only account: reads work, writes fail at
	/// the client.
	async fn signing_handle(
		&self,
		account: &str,
	) -> Result<Option<SigningHandle>, ProviderError>;

	/// Subscribe to wallet change notifications.
	///
	/// The stream ends when the provider tears the subscription down.
	fn subscribe(&self) -> WalletEventStream;
}

/// Handle for pushing wallet notifications into a provider's subscription.
#[derive(Clone)]
pub struct WalletEventSink {
	tx: mpsc::UnboundedSender<WalletEvent>,
}

impl WalletEventSink {
	pub fn accounts_changed(&self, accounts: Vec<String>) {
		let _ = self.tx.send(WalletEvent::AccountsChanged(accounts));
	}

	pub fn chain_changed(&self, chain_id: u64) {
		let _ = self.tx.send(WalletEvent::ChainChanged(chain_id));
	}
}

/// Wallet provider for hosts without an interactive wallet.
///
/// Exposes one fixed account on one network with a freshly minted session
/// token as its signing capability. The host drives change notifications
/// through the [`WalletEventSink`] returned by `emitter`.
pub struct StaticWalletProvider {
	account: String,
	chain_id: u64,
	handle: SigningHandle,
	events_tx: mpsc::UnboundedSender<WalletEvent>,
	events_rx: Mutex<Option<mpsc::UnboundedReceiver<WalletEvent>>>,
}

impl StaticWalletProvider {
	pub fn new(account: impl Into<String>, chain_id: u64) -> Self {
		let account = account.into();
		let handle = SigningHandle::new(account.clone(), generate_session_token());
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		Self {
			account,
			chain_id,
			handle,
			events_tx,
			events_rx: Mutex::new(Some(events_rx)),
		}
	}

	/// Handle the host uses to emit account and network changes.
	pub fn emitter(&self) -> WalletEventSink {
		WalletEventSink {
			tx: self.events_tx.clone(),
		}
	}
}

#[async_trait::async_trait]
impl WalletProvider for StaticWalletProvider {
	fn is_available(&self) -> bool {
		true
	}

	async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
		Ok(vec![self.account.clone()])
	}

	async fn chain_id(&self) -> Result<u64, ProviderError> {
		Ok(self.chain_id)
	}

	async fn signing_handle(
		&self,
		account: &str,
	) -> Result<Option<SigningHandle>, ProviderError> {
		if account == self.account {
			Ok(Some(self.handle.clone()))
		} else {
			Ok(None)
		}
	}

	fn subscribe(&self) -> WalletEventStream {
		match self.events_rx.lock().unwrap().take() {
			Some(rx) => Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
				rx.recv().await.map(|event| (event, rx))
			})),
			None => {
				warn!("Wallet notification stream was already taken");
				Box::pin(futures_util::stream::empty())
			}
		}
	}
}

pub fn generate_session_token() -> String {
	let mut token = [0u8; 32];
	rand::rng().fill(&mut token);
	hex::encode(token)
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures_util::StreamExt;

	#[tokio::test]
	async fn emitted_events_arrive_in_order() {
		let provider = StaticWalletProvider::new("tkt1account", 1);
		let emitter = provider.emitter();
		let mut events = provider.subscribe();

		emitter.accounts_changed(vec!["tkt1other".to_string()]);
		emitter.chain_changed(5);

		assert_eq!(
			events.next().await,
			Some(WalletEvent::AccountsChanged(vec!["tkt1other".to_string()]))
		);
		assert_eq!(events.next().await, Some(WalletEvent::ChainChanged(5)));
	}

	#[tokio::test]
	async fn signing_handle_is_scoped_to_the_configured_account() {
		let provider = StaticWalletProvider::new("tkt1account", 1);

		let handle = provider
			.signing_handle("tkt1account")
			.await
			.expect("provider failed");
		assert_eq!(handle.expect("missing handle").account(), "tkt1account");

		let other = provider
			.signing_handle("tkt1stranger")
			.await
			.expect("provider failed");
		assert!(other.is_none());
	}
}
