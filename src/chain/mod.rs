//! Chain State Reader and Writer
//!
//! The wiring procedure only ever talks to a chain through two seams:
//!
//! ```text
//!   NetworkContext::read     → StateReader::read(address, field, args)
//!   NetworkContext::execute  → SignerManager::sign_transaction
//!                            → StateWriter::send(signed tx) → Receipt | Reverted
//! ```
//!
//! [`LocalChain`] implements both over an in-memory state that can be saved to
//! and restored from JSON, which is what the CLI and the fixtures run against.

pub mod catalog;
pub mod errors;
pub mod local;
pub mod state;

pub use catalog::{Blueprint, ContractCatalog, Effect, Guard, MethodSpec};
pub use errors::ChainError;
pub use local::LocalChain;
pub use state::{ChainState, ContractAccount};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::abi::ContractValue;
use crate::signer::SignedTransaction;

/// Result of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub from: Address,
    /// Call target, `None` for contract creation
    pub to: Option<Address>,
    /// Created contract, `None` for calls
    pub contract_address: Option<Address>,
    /// Called method, `None` for contract creation
    pub method: Option<String>,
}

/// Reads a named property off a deployed contract.
#[async_trait]
pub trait StateReader: Send + Sync {
    /// Read `field` (a public variable or view function) from `contract`.
    ///
    /// `args` are the view function's arguments, empty for plain variables.
    async fn read(
        &self,
        contract: Address,
        field: &str,
        args: &[ContractValue],
    ) -> Result<ContractValue, ChainError>;
}

/// Submits signed transactions and waits for them to be mined.
#[async_trait]
pub trait StateWriter: Send + Sync {
    /// Send a signed transaction. Returns once mined; a revert is an error.
    async fn send(&self, tx: SignedTransaction) -> Result<Receipt, ChainError>;
}
