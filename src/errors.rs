use std::path::PathBuf;
use thiserror::Error;

use crate::chain::ChainError;
use crate::signer::SignerError;
use crate::wiring::PendingCall;

/// Errors raised while deploying and wiring contracts
#[derive(Debug, Error)]
pub enum DeployError {
    /// A required deployment record does not exist on the network
    #[error("No deployment found for: {name} on {network}")]
    NotFound {
        /// Logical contract name
        name: String,
        /// Network namespace searched
        network: String,
    },

    /// Underlying chain call failed (including reverts)
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Signing failed for a controlled account
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The required sender is not a controlled account
    #[error("Unknown signer {} for {}.{} on {}", .0.from, .0.contract, .0.method, .0.network)]
    UnknownSigner(Box<PendingCall>),

    /// A named account is not configured for the network
    #[error("Named account '{name}' is not configured on {network}")]
    MissingNamedAccount { name: String, network: String },

    /// No companion network registered under the tag
    #[error("No companion network '{tag}' for {network}")]
    UnknownCompanion { tag: String, network: String },

    /// Network missing from the deploy configuration
    #[error("Network '{0}' is not configured")]
    UnknownNetwork(String),

    /// A read returned a value of the wrong type
    #[error("Expected {expected} from {contract}.{field}, got {got}")]
    UnexpectedValue {
        contract: String,
        field: String,
        expected: &'static str,
        got: String,
    },

    /// Deploy steps depend on each other in a loop
    #[error("Deploy step dependency cycle involving '{0}'")]
    DependencyCycle(String),

    /// Fewer accounts than a fixture needs
    #[error("Not enough accounts: need {needed}, have {available}")]
    NotEnoughAccounts { needed: usize, available: usize },

    /// Filesystem error in the deployment registry or configuration
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed deployment file or configuration
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Chain id marker of a deployments folder is not a number
    #[error("Invalid chain id marker at {path}: {source}")]
    InvalidChainIdMarker {
        path: PathBuf,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl DeployError {
    /// Whether the error is an on-chain revert.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Chain(ChainError::Reverted { .. }))
    }

    pub(crate) fn not_found(name: &str, network: &str) -> Self {
        Self::NotFound { name: name.to_string(), network: network.to_string() }
    }
}
