use alloy_primitives::{Address, Signature, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::errors::SignerError;
use super::transaction::{SignedTransaction, TransactionRequest};

/// Keys of the accounts a deployment run controls.
///
/// Any sender without a key here is an unknown signer: writes it must make are
/// captured for external signing instead of being submitted.
#[derive(Debug)]
pub struct SignerManager {
    /// Map of address to signer
    signers: RwLock<HashMap<Address, PrivateKeySigner>>,
}

impl SignerManager {
    /// Create a new signer manager
    pub fn new() -> Self {
        Self { signers: RwLock::new(HashMap::new()) }
    }

    /// Add a signer from a private key hex string
    pub async fn add_signer_from_hex(&self, private_key_hex: &str) -> Result<Address, SignerError> {
        let signer = private_key_hex
            .parse::<PrivateKeySigner>()
            .map_err(|_| SignerError::InvalidPrivateKey)?;

        let address = signer.address();
        self.signers.write().await.insert(address, signer);

        Ok(address)
    }

    /// Add a signer directly
    pub async fn add_signer(&self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        self.signers.write().await.insert(address, signer);
        address
    }

    /// Check if we have a signer for the given address
    pub async fn has_signer(&self, address: &Address) -> bool {
        self.signers.read().await.contains_key(address)
    }

    /// Get all registered signer addresses, sorted
    pub async fn signer_addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.signers.read().await.keys().copied().collect();
        addresses.sort();
        addresses
    }

    /// Sign a message hash with the specified signer
    pub async fn sign_hash(&self, address: &Address, hash: B256) -> Result<Signature, SignerError> {
        let signers = self.signers.read().await;
        let signer =
            signers.get(address).ok_or_else(|| SignerError::NoSignerForAddress(*address))?;

        signer
            .sign_hash(&hash)
            .await
            .map_err(|e| SignerError::SigningFailed(e.to_string()))
    }

    /// Sign a transaction as its `from` account
    pub async fn sign_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<SignedTransaction, SignerError> {
        let signature = self.sign_hash(&request.from, request.signing_hash()).await?;
        Ok(SignedTransaction { request, signature })
    }
}

impl Default for SignerManager {
    fn default() -> Self {
        Self::new()
    }
}
