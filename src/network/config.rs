use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::accounts::{dev_accounts, AccountRef};
use crate::constants::{ASSET_ADMIN, DEPLOYER, GAME_TOKEN_ADMIN, L1, L2, LAND_ADMIN, TESTNET_TAG};
use crate::errors::DeployError;

/// One network the tool can deploy to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Network name, also the deployments sub-folder
    pub name: String,
    pub chain_id: u64,
    /// Free-form tags (`testnet`, `L1`, `L2`, ...)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the network is a real, persistent chain
    #[serde(default)]
    pub live: bool,
    /// Account list indexed by named accounts; the dev accounts when empty
    #[serde(default)]
    pub accounts: Vec<Address>,
    #[serde(default)]
    pub named_accounts: BTreeMap<String, AccountRef>,
    /// Companion networks by tag (`l1` -> `ethereum_local`)
    #[serde(default)]
    pub companions: BTreeMap<String, String>,
}

impl NetworkConfig {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_testnet(&self) -> bool {
        self.has_tag(TESTNET_TAG)
    }

    /// Accounts named accounts index into
    pub fn account_list(&self) -> Vec<Address> {
        if self.accounts.is_empty() {
            dev_accounts()
        } else {
            self.accounts.clone()
        }
    }
}

/// Skip predicate for steps that only run on test networks.
pub fn skip_unless_testnet(config: &NetworkConfig) -> bool {
    !config.is_testnet()
}

/// All networks known to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub networks: Vec<NetworkConfig>,
}

impl DeployConfig {
    /// Two local dev chains paired as companions: `polygon_local` (L2) and
    /// `ethereum_local` (L1).
    pub fn local_dev() -> Self {
        let named_accounts: BTreeMap<String, AccountRef> = [
            (DEPLOYER, 0),
            (LAND_ADMIN, 1),
            (GAME_TOKEN_ADMIN, 2),
            (ASSET_ADMIN, 3),
        ]
        .into_iter()
        .map(|(name, index)| (name.to_string(), AccountRef::Index(index)))
        .collect();

        let network = |name: &str, chain_id: u64, layer: &str, companion: (&str, &str)| NetworkConfig {
            name: name.to_string(),
            chain_id,
            tags: vec![TESTNET_TAG.to_string(), layer.to_string()],
            live: false,
            accounts: Vec::new(),
            named_accounts: named_accounts.clone(),
            companions: BTreeMap::from([(companion.0.to_string(), companion.1.to_string())]),
        };

        Self {
            networks: vec![
                network("ethereum_local", 31337, "L1", (L2, "polygon_local")),
                network("polygon_local", 31338, "L2", (L1, "ethereum_local")),
            ],
        }
    }

    /// Load a configuration file.
    pub async fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DeployError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw).map_err(|source| DeployError::Json { path: path.to_path_buf(), source })
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig, DeployError> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| DeployError::UnknownNetwork(name.to_string()))
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self::local_dev()
    }
}
