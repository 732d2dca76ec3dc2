//! Deployment Signers
//!
//! This module provides:
//! - Key management for the accounts a deployment run controls
//! - Transaction signing and sender recovery
//! - The dev keys used on local test networks

pub mod dev;
pub mod errors;
pub mod manager;
pub mod transaction;

pub use errors::SignerError;
pub use manager::SignerManager;
pub use transaction::{
    bytes_to_signature, signature_to_bytes, SignedTransaction, TransactionRequest, TxKind,
};
