use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::abi::{calldata, method_signature, ContractValue};
use crate::chain::Receipt;
use crate::errors::DeployError;

/// A write that needs a signer this run does not control.
///
/// Carries everything an external signer (multisig, hardware wallet) needs to
/// submit the call: target, sender, canonical signature and ABI calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCall {
    pub id: Uuid,
    pub network: String,
    pub chain_id: u64,
    /// Logical contract name
    pub contract: String,
    pub to: Address,
    /// Required sender
    pub from: Address,
    pub method: String,
    /// Canonical signature, e.g. `setPolygonLandTunnel(address)`
    pub signature: String,
    pub args: Vec<ContractValue>,
    /// `selector ++ abi.encode(args)`
    pub data: Bytes,
}

impl PendingCall {
    pub fn new(
        network: &str,
        chain_id: u64,
        contract: &str,
        to: Address,
        from: Address,
        method: &str,
        args: Vec<ContractValue>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            network: network.to_string(),
            chain_id,
            contract: contract.to_string(),
            to,
            from,
            method: method.to_string(),
            signature: method_signature(method, &args),
            data: calldata(method, &args),
            args,
        }
    }
}

/// Outcome of a state-changing call that may need an unknown signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Submitted and mined
    Executed(Receipt),
    /// Captured for later execution by the required signer
    Deferred(PendingCall),
}

impl WriteOutcome {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Executed(receipt) => Some(receipt),
            Self::Deferred(_) => None,
        }
    }
}

/// Shared log of deferred calls collected during a run.
#[derive(Debug, Clone, Default)]
pub struct DeferredCalls {
    calls: Arc<Mutex<Vec<PendingCall>>>,
}

impl DeferredCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, call: PendingCall) {
        self.calls.lock().await.push(call);
    }

    /// Copy of every call captured so far
    pub async fn list(&self) -> Vec<PendingCall> {
        self.calls.lock().await.clone()
    }
}

/// Write `calls` to `path` as JSON.
///
/// With nothing deferred, a file left at `path` by an earlier run is removed.
pub async fn write_deferred_file(path: &Path, calls: &[PendingCall]) -> Result<(), DeployError> {
    let io_error = |source| DeployError::Io { path: path.to_path_buf(), source };
    if calls.is_empty() {
        return match tokio::fs::remove_file(path).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(io_error(err)),
            _ => Ok(()),
        };
    }
    let json = serde_json::to_string_pretty(calls)
        .map_err(|source| DeployError::Json { path: path.to_path_buf(), source })?;
    tokio::fs::write(path, json).await.map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> PendingCall {
        PendingCall::new(
            "polygon_local",
            31338,
            "PolygonLand",
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            "setPolygonLandTunnel",
            vec![ContractValue::from(Address::repeat_byte(0x33))],
        )
    }

    #[tokio::test]
    async fn test_deferred_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deferred.json");
        write_deferred_file(&path, &[call()]).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let calls: Vec<PendingCall> = serde_json::from_str(&raw).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].signature, "setPolygonLandTunnel(address)");
    }

    #[tokio::test]
    async fn test_stale_deferred_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deferred.json");
        write_deferred_file(&path, &[call()]).await.unwrap();

        write_deferred_file(&path, &[]).await.unwrap();
        assert!(!path.exists());

        // nothing to remove
        write_deferred_file(&path, &[]).await.unwrap();
    }
}
