use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{ContractRegistry, DeploymentRecord};
use crate::chain::ChainError;
use crate::errors::DeployError;

/// Marker file holding the chain id a deployments folder belongs to
const CHAIN_ID_FILE: &str = ".chainId";

/// Registry persisted as one JSON file per contract:
///
/// ```text
///   <root>/<network>/.chainId
///   <root>/<network>/PolygonLandTunnel.json
///   <root>/<network>/TRUSTED_FORWARDER.json
/// ```
///
/// Files are read on every lookup so records written by other runs are seen.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    network: String,
    dir: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DeployError + '_ {
    move |source| DeployError::Io { path: path.to_path_buf(), source }
}

impl FileRegistry {
    /// Open (creating if needed) the deployments folder of `network` under `root`.
    ///
    /// Fails when the folder was created for a different chain id.
    pub async fn open(root: &Path, network: &str, chain_id: u64) -> Result<Self, DeployError> {
        let dir = root.join(network);
        tokio::fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;

        let marker = dir.join(CHAIN_ID_FILE);
        match tokio::fs::read_to_string(&marker).await {
            Ok(raw) => {
                let recorded = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|source| DeployError::InvalidChainIdMarker { path: marker.clone(), source })?;
                if recorded != chain_id {
                    return Err(ChainError::ChainIdMismatch { expected: chain_id, got: recorded }.into());
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&marker, chain_id.to_string())
                    .await
                    .map_err(io_error(&marker))?;
            }
            Err(err) => return Err(io_error(&marker)(err)),
        }

        Ok(Self { network: network.to_string(), dir })
    }

    /// Folder holding this network's records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    async fn read_record(path: &Path) -> Result<DeploymentRecord, DeployError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(io_error(path))?;
        serde_json::from_str(&raw).map_err(|source| DeployError::Json { path: path.to_path_buf(), source })
    }
}

#[async_trait]
impl ContractRegistry for FileRegistry {
    fn network(&self) -> &str {
        &self.network
    }

    async fn get_or_null(&self, name: &str) -> Result<Option<DeploymentRecord>, DeployError> {
        let path = self.record_path(name);
        if !tokio::fs::try_exists(&path).await.map_err(io_error(&path))? {
            return Ok(None);
        }
        Self::read_record(&path).await.map(Some)
    }

    async fn save(&self, record: DeploymentRecord) -> Result<(), DeployError> {
        let path = self.record_path(&record.name);
        let json = serde_json::to_string_pretty(&record)
            .map_err(|source| DeployError::Json { path: path.clone(), source })?;
        tokio::fs::write(&path, json).await.map_err(io_error(&path))
    }

    async fn records(&self) -> Result<Vec<DeploymentRecord>, DeployError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_error(&self.dir))?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&self.dir))? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                records.push(Self::read_record(&path).await?);
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
