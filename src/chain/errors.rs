use alloy_primitives::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by chain readers and writers
#[derive(Debug, Error)]
pub enum ChainError {
    /// The transaction was mined but reverted
    #[error("Transaction reverted: {method} ({reason})")]
    Reverted {
        /// Call target, `None` for contract creation
        to: Option<Address>,
        /// Method name, or the contract type for creations
        method: String,
        /// Revert reason
        reason: String,
    },

    /// No contract code at the address
    #[error("No contract deployed at {0}")]
    NoContract(Address),

    /// The contract exposes no such field or getter
    #[error("Contract at {contract} has no field '{field}'")]
    UnknownField {
        /// Contract address
        contract: Address,
        /// Requested field
        field: String,
    },

    /// Signature does not recover to the declared sender
    #[error("Invalid transaction signature: {0}")]
    InvalidSignature(String),

    /// Transaction was signed for a different chain
    #[error("Chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch {
        /// This chain's id
        expected: u64,
        /// Chain id in the transaction
        got: u64,
    },

    /// Reading or writing persisted chain state failed
    #[error("Chain state I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted chain state is malformed
    #[error("Malformed chain state {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ChainError {
    /// Build a revert for a call or creation.
    pub fn reverted(to: Option<Address>, method: &str, reason: impl Into<String>) -> Self {
        Self::Reverted { to, method: method.to_string(), reason: reason.into() }
    }
}
