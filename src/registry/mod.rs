//! Contract Registry
//!
//! Binds logical contract names to deployment records within one network
//! namespace. Records are written once per deployment and are stable
//! afterwards, which is what lets every deploy step be re-run safely.

pub mod file;
pub mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::abi::ContractValue;
use crate::errors::DeployError;

/// A deployed contract, keyed by logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Logical name (`PolygonLandTunnel`, `TRUSTED_FORWARDER`, ...)
    pub name: String,
    pub address: Address,
    /// Contract type the record was deployed from
    pub contract: String,
    /// Constructor arguments
    #[serde(default)]
    pub args: Vec<ContractValue>,
    /// Creation transaction, when deployed by this tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    /// Account that deployed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer: Option<Address>,
}

impl DeploymentRecord {
    /// Whether redeploying with `contract` and `args` would produce the same record.
    pub fn matches(&self, contract: &str, args: &[ContractValue]) -> bool {
        self.contract == contract && self.args == args
    }
}

/// Storage for deployment records of one network.
#[async_trait]
pub trait ContractRegistry: Send + Sync {
    /// Network namespace of the records
    fn network(&self) -> &str;

    /// Record under `name`, or `None` when not deployed.
    async fn get_or_null(&self, name: &str) -> Result<Option<DeploymentRecord>, DeployError>;

    /// Record under `name`; `NotFound` when not deployed.
    async fn get(&self, name: &str) -> Result<DeploymentRecord, DeployError> {
        self.get_or_null(name)
            .await?
            .ok_or_else(|| DeployError::not_found(name, self.network()))
    }

    /// Insert or replace the record under `record.name`.
    async fn save(&self, record: DeploymentRecord) -> Result<(), DeployError>;

    /// All records, sorted by name.
    async fn records(&self) -> Result<Vec<DeploymentRecord>, DeployError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeploymentRecord {
        DeploymentRecord {
            name: "PolygonLandTunnel".to_string(),
            address: Address::repeat_byte(0xaa),
            contract: "PolygonLandTunnel".to_string(),
            args: vec![ContractValue::from(500u64), ContractValue::uints(&[5, 10])],
            transaction_hash: None,
            deployer: None,
        }
    }

    #[test]
    fn test_record_matches_contract_and_args() {
        let record = record();
        assert!(record.matches("PolygonLandTunnel", &record.args.clone()));
        assert!(!record.matches("LandTunnel", &record.args.clone()));
        assert!(!record.matches("PolygonLandTunnel", &[ContractValue::from(501u64)]));
    }

    #[test]
    fn test_record_json_omits_unknown_transaction() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("transactionHash").is_none());
        assert_eq!(json["contract"], "PolygonLandTunnel");
    }

    #[tokio::test]
    async fn test_get_reports_not_found_with_network() {
        let registry = MemoryRegistry::new("polygon_local");
        let err = registry.get("LandTunnel").await.unwrap_err();
        match err {
            DeployError::NotFound { name, network } => {
                assert_eq!(name, "LandTunnel");
                assert_eq!(network, "polygon_local");
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }
}
