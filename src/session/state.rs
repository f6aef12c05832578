use crate::ledger::ContractRegistry;
use std::fmt;
use std::sync::Arc;

/// Opaque signing capability for one account.
///
/// Minted by the wallet provider during authorization and consumed by the
/// transport when submitting transactions. The authorization token never
/// appears in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningHandle {
    account: String,
    token: String,
}

impl SigningHandle {
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// The raw authorization token, for transports only.
    pub fn authorization(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SigningHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningHandle")
            .field("account", &self.account)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The currently authorized account.
///
/// An identity is either fully populated or entirely absent from the session
/// state; dependents never observe a partial one. `signer` is `None` only
/// for watch-only accounts whose provider reports no signing capability;
/// write calls against such an identity fail at the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Checksum-verified account address, canonical Bech32m form.
    pub address: String,
    /// Network the account is authorized on.
    pub chain_id: u64,
    /// Capability to authorize writes, when the account has one.
    pub signer: Option<SigningHandle>,
}

/// Session failures surfaced through the `Failed` status
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet capability available in this environment")]
    NoWalletAvailable,

    #[error("wallet authorization rejected: {0}")]
    AuthorizationRejected(String),

    #[error("contract address not configured: {0}")]
    ContractsNotConfigured(String),

    #[error("account address rejected: {0}")]
    InvalidAccount(String),

    #[error("wallet provider failure: {0}")]
    Provider(String),
}

/// Lifecycle position of the wallet session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// Session is starting up or was invalidated and needs a reconnect.
    Initializing,
    /// An identity is established and the registry is bound to it.
    Connected,
    /// No wallet is connected; an expected condition, not a failure.
    Disconnected,
    /// A connect attempt failed; a fresh connect may recover.
    Failed(SessionError),
}

/// The single record dependents observe.
///
/// Published wholesale on every transition; identity, registry and status in
/// one generation always describe the same moment, so a reader never sees a
/// registry from one account paired with the identity of another.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub registry: Option<Arc<ContractRegistry>>,
    pub status: SessionStatus,
}

impl SessionState {
    pub fn initializing() -> Self {
        Self {
            identity: None,
            registry: None,
            status: SessionStatus::Initializing,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            identity: None,
            registry: None,
            status: SessionStatus::Disconnected,
        }
    }

    pub fn connected(identity: Identity, registry: Arc<ContractRegistry>) -> Self {
        Self {
            identity: Some(identity),
            registry: Some(registry),
            status: SessionStatus::Connected,
        }
    }

    pub fn failed(error: SessionError) -> Self {
        Self {
            identity: None,
            registry: None,
            status: SessionStatus::Failed(error),
        }
    }

    /// Failure state that keeps the resolved identity, so diagnostics can
    /// show the account matched even though the session is unusable.
    pub fn failed_with_identity(identity: Identity, error: SessionError) -> Self {
        Self {
            identity: Some(identity),
            registry: None,
            status: SessionStatus::Failed(error),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    /// Identity and registry of a connected session, or `None` for any
    /// other status.
    pub fn connection(&self) -> Option<(&Identity, &Arc<ContractRegistry>)> {
        if !self.is_connected() {
            return None;
        }
        match (&self.identity, &self.registry) {
            (Some(identity), Some(registry)) => Some((identity, registry)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_token() {
        let handle = SigningHandle::new("tkt1account", "secret-token");
        let rendered = format!("{:?}", handle);
        assert!(rendered.contains("tkt1account"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn connection_is_only_observable_while_connected() {
        let identity = Identity {
            address: "tkt1account".to_string(),
            chain_id: 1,
            signer: None,
        };

        let failed = SessionState::failed_with_identity(
            identity,
            SessionError::ContractsNotConfigured("TicketNFT".to_string()),
        );
        assert!(failed.identity.is_some());
        assert!(failed.connection().is_none());
        assert!(SessionState::disconnected().connection().is_none());
    }
}
