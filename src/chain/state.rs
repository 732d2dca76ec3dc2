use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::errors::ChainError;
use super::Receipt;
use crate::abi::ContractValue;

/// A deployed contract instance on the local chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAccount {
    /// Contract type name (catalog key)
    pub contract: String,
    /// Stored fields by name
    pub fields: BTreeMap<String, ContractValue>,
}

/// Complete, persistable state of a local chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainState {
    pub chain_id: u64,
    pub block_number: u64,
    /// Next nonce per sender
    pub nonces: BTreeMap<Address, u64>,
    pub contracts: BTreeMap<Address, ContractAccount>,
    /// Every mined transaction, in order
    pub receipts: Vec<Receipt>,
}

impl ChainState {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id, ..Default::default() }
    }

    /// Load state from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, ChainError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ChainError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw).map_err(|source| ChainError::Json { path: path.to_path_buf(), source })
    }

    /// Write state as pretty JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), ChainError> {
        let io_err = |source| ChainError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ChainError::Json { path: path.to_path_buf(), source })?;
        tokio::fs::write(path, json).await.map_err(io_err)
    }

    /// Take the next nonce for `sender`.
    pub fn bump_nonce(&mut self, sender: Address) -> u64 {
        let nonce = self.nonces.entry(sender).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }
}
