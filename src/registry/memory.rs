use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{ContractRegistry, DeploymentRecord};
use crate::errors::DeployError;

/// Registry kept in memory for the lifetime of the process.
#[derive(Debug)]
pub struct MemoryRegistry {
    network: String,
    records: RwLock<BTreeMap<String, DeploymentRecord>>,
}

impl MemoryRegistry {
    pub fn new(network: impl Into<String>) -> Self {
        Self { network: network.into(), records: RwLock::new(BTreeMap::new()) }
    }
}

#[async_trait]
impl ContractRegistry for MemoryRegistry {
    fn network(&self) -> &str {
        &self.network
    }

    async fn get_or_null(&self, name: &str) -> Result<Option<DeploymentRecord>, DeployError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn save(&self, record: DeploymentRecord) -> Result<(), DeployError> {
        self.records.write().await.insert(record.name.clone(), record);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<DeploymentRecord>, DeployError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
