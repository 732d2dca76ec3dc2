use alloy_primitives::{keccak256, Address, Bytes, Signature, B256};
use serde::{Deserialize, Serialize};

use super::errors::SignerError;
use crate::abi::{calldata, encode_args, ContractValue};

/// What a transaction does once mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TxKind {
    /// Call `method` on the contract at `to`
    Call { to: Address, method: String },
    /// Create a new instance of the named contract type
    Create { contract: String },
}

/// An unsigned state-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Chain the transaction is bound to
    pub chain_id: u64,
    /// Sender (must hold the key that signs it)
    pub from: Address,
    /// Call or creation
    pub kind: TxKind,
    /// Method or constructor arguments
    pub args: Vec<ContractValue>,
}

impl TransactionRequest {
    pub fn call(chain_id: u64, from: Address, to: Address, method: &str, args: Vec<ContractValue>) -> Self {
        Self {
            chain_id,
            from,
            kind: TxKind::Call { to, method: method.to_string() },
            args,
        }
    }

    pub fn create(chain_id: u64, from: Address, contract: &str, args: Vec<ContractValue>) -> Self {
        Self {
            chain_id,
            from,
            kind: TxKind::Create { contract: contract.to_string() },
            args,
        }
    }

    /// Payload sent to the chain: ABI calldata for calls, name hash + encoded args for creations.
    pub fn input(&self) -> Bytes {
        match &self.kind {
            TxKind::Call { method, .. } => calldata(method, &self.args),
            TxKind::Create { contract } => {
                let mut data = keccak256(contract.as_bytes()).to_vec();
                data.extend(encode_args(&self.args));
                data.into()
            }
        }
    }

    /// Hash the sender signs: keccak256(chainId || from || to || input).
    pub fn signing_hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(8 + 20 + 20 + 64);
        buf.extend_from_slice(&self.chain_id.to_be_bytes());
        buf.extend_from_slice(self.from.as_slice());
        if let TxKind::Call { to, .. } = &self.kind {
            buf.extend_from_slice(to.as_slice());
        }
        buf.extend_from_slice(&self.input());
        keccak256(buf)
    }
}

/// A transaction together with the sender's signature over its signing hash.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub request: TransactionRequest,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Recover the address that produced the signature.
    pub fn recover_signer(&self) -> Result<Address, SignerError> {
        self.signature
            .recover_address_from_prehash(&self.request.signing_hash())
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))
    }

    /// Transaction hash: keccak256(signing hash || r || s || v).
    pub fn hash(&self) -> B256 {
        let mut buf = self.request.signing_hash().to_vec();
        buf.extend_from_slice(&signature_to_bytes(&self.signature));
        keccak256(buf)
    }
}

/// Convert a signature to bytes (r || s || v)
pub fn signature_to_bytes(sig: &Signature) -> [u8; 65] {
    let mut bytes = [0u8; 65];
    bytes[..32].copy_from_slice(&sig.r().to_be_bytes::<32>());
    bytes[32..64].copy_from_slice(&sig.s().to_be_bytes::<32>());
    bytes[64] = sig.v() as u8;
    bytes
}

/// Convert bytes to a signature
pub fn bytes_to_signature(bytes: &[u8]) -> Result<Signature, SignerError> {
    if bytes.len() != 65 {
        return Err(SignerError::InvalidSignature(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    Signature::try_from(bytes).map_err(|e| SignerError::InvalidSignature(e.to_string()))
}
