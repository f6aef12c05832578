//! Types for the ledger access layer

use serde::{Deserialize, Serialize};

/// Mutability of a contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Read-only call, answered from ledger state without a transaction.
    View,
    /// State-mutating call, submitted as a value-bearing transaction and
    /// requiring a signing capability.
    Transaction,
}

/// Callable-method schema of one contract.
///
/// Lists every method the application may invoke on the contract together
/// with its mutability. Clients consult the schema before touching the wire,
/// so an unknown method or a write issued through the read path fails
/// locally.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    name: &'static str,
    methods: Vec<(&'static str, MethodKind)>,
}

impl ContractInterface {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            methods: Vec::new(),
        }
    }

    /// Adds a read-only method to the schema
    pub fn view(mut self, method: &'static str) -> Self {
        self.methods.push((method, MethodKind::View));
        self
    }

    /// Adds a state-mutating method to the schema
    pub fn transaction(mut self, method: &'static str) -> Self {
        self.methods.push((method, MethodKind::Transaction));
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn kind_of(&self, method: &str) -> Option<MethodKind> {
        self.methods
            .iter()
            .find(|(name, _)| *name == method)
            .map(|(_, kind)| *kind)
    }
}

/// Confirmation record for a submitted transaction.
///
/// Returned only once the gateway reports the transaction included and
/// successful; a reverted transaction surfaces as an error instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the confirmed transaction.
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Block the transaction was included in.
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
}

/// Error types for gateway transport operations
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("no confirmation for transaction {0}")]
    ConfirmationTimeout(String),

    #[error("no result returned")]
    NoData,
}

/// Error types for contract client operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no address configured for contract {0}")]
    MissingAddress(String),

    #[error("method {0} is not part of the contract interface")]
    UnknownMethod(String),

    #[error("method {0} mutates ledger state and must be sent as a transaction")]
    StateMutating(String),

    #[error("method {0} is read-only and cannot be sent as a transaction")]
    ReadOnly(String),

    #[error("bound identity has no signing capability")]
    Unauthorized,

    #[error("ledger call failed: {0}")]
    Rpc(#[from] RpcError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_reports_method_kinds() {
        let interface = ContractInterface::new("Example")
            .transaction("mint")
            .view("balanceOf");

        assert_eq!(interface.name(), "Example");
        assert_eq!(interface.kind_of("mint"), Some(MethodKind::Transaction));
        assert_eq!(interface.kind_of("balanceOf"), Some(MethodKind::View));
        assert_eq!(interface.kind_of("burn"), None);
    }
}
