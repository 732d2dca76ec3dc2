use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::config::DeployConfig;
use super::context::NetworkContext;
use crate::chain::LocalChain;
use crate::errors::DeployError;
use crate::signer::SignerManager;
use crate::wiring::{DeferredCalls, PendingCall};

/// The network a step runs against plus its companion networks by tag.
#[derive(Debug, Clone)]
pub struct DeployEnv {
    network: Arc<NetworkContext>,
    companions: BTreeMap<String, Arc<NetworkContext>>,
}

impl DeployEnv {
    pub fn new(network: Arc<NetworkContext>) -> Self {
        Self { network, companions: BTreeMap::new() }
    }

    pub fn with_companion(mut self, tag: &str, ctx: Arc<NetworkContext>) -> Self {
        self.companions.insert(tag.to_string(), ctx);
        self
    }

    pub fn network(&self) -> &NetworkContext {
        &self.network
    }

    /// Context of the companion network registered under `tag` (`l1`, `l2`).
    pub fn companion(&self, tag: &str) -> Result<&NetworkContext, DeployError> {
        self.companions
            .get(tag)
            .map(Arc::as_ref)
            .ok_or_else(|| DeployError::UnknownCompanion {
                tag: tag.to_string(),
                network: self.network.name().to_string(),
            })
    }

    pub fn companion_tags(&self) -> impl Iterator<Item = &str> {
        self.companions.keys().map(String::as_str)
    }

    /// Deferred calls of the network and every companion, each reported once.
    pub async fn deferred_calls(&self) -> Vec<PendingCall> {
        let mut seen = BTreeSet::new();
        let mut calls = Vec::new();
        for ctx in std::iter::once(&self.network).chain(self.companions.values()) {
            for call in ctx.deferred_calls().await {
                if seen.insert(call.id) {
                    calls.push(call);
                }
            }
        }
        calls
    }
}

/// A [`DeployEnv`] whose networks all run on in-process [`LocalChain`]s.
#[derive(Debug, Clone)]
pub struct LocalEnv {
    pub env: DeployEnv,
    /// Chains by network name
    pub chains: BTreeMap<String, Arc<LocalChain>>,
    contexts: BTreeMap<String, Arc<NetworkContext>>,
}

impl LocalEnv {
    /// Build `network` and its configured companions on fresh local chains,
    /// sharing one signer set and one deferred-call log.
    pub fn build(
        config: &DeployConfig,
        network: &str,
        signers: Arc<SignerManager>,
    ) -> Result<Self, DeployError> {
        let deferred = DeferredCalls::new();
        let mut chains = BTreeMap::new();
        let mut contexts = BTreeMap::new();

        let main = config.network(network)?;
        for name in std::iter::once(network).chain(main.companions.values().map(String::as_str)) {
            if contexts.contains_key(name) {
                continue;
            }
            let (ctx, chain) = NetworkContext::in_memory(config.network(name)?.clone(), signers.clone())?;
            chains.insert(name.to_string(), chain);
            contexts.insert(name.to_string(), Arc::new(ctx.with_deferred(deferred.clone())));
        }

        let env = Self::assemble(&contexts, network)?;
        Ok(Self { env, chains, contexts })
    }

    /// Environment rooted at another network of this run, over the same
    /// chains and registries. Only companions opened by [`build`](Self::build) are attached.
    pub fn env_for(&self, network: &str) -> Result<DeployEnv, DeployError> {
        Self::assemble(&self.contexts, network)
    }

    fn assemble(
        contexts: &BTreeMap<String, Arc<NetworkContext>>,
        network: &str,
    ) -> Result<DeployEnv, DeployError> {
        let ctx = contexts
            .get(network)
            .ok_or_else(|| DeployError::UnknownNetwork(network.to_string()))?;
        let mut env = DeployEnv::new(ctx.clone());
        for (tag, companion) in &ctx.config().companions {
            if let Some(companion) = contexts.get(companion) {
                env = env.with_companion(tag, companion.clone());
            }
        }
        Ok(env)
    }

    pub fn context(&self, network: &str) -> Result<Arc<NetworkContext>, DeployError> {
        self.contexts
            .get(network)
            .cloned()
            .ok_or_else(|| DeployError::UnknownNetwork(network.to_string()))
    }

    pub fn chain(&self, network: &str) -> Option<&Arc<LocalChain>> {
        self.chains.get(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{L1, L2};
    use crate::signer::dev;

    #[tokio::test]
    async fn test_local_env_wires_companions() {
        let local = LocalEnv::build(&DeployConfig::local_dev(), "polygon_local", dev::setup_dev_signers(2).await)
            .unwrap();

        assert_eq!(local.env.network().name(), "polygon_local");
        assert_eq!(local.env.companion(L1).unwrap().name(), "ethereum_local");
        assert_eq!(local.env.companion_tags().collect::<Vec<_>>(), vec![L1]);
        assert!(local.chain("ethereum_local").is_some());
        assert_eq!(local.chain("polygon_local").unwrap().chain_id(), 31338);
    }

    #[tokio::test]
    async fn test_unknown_companion() {
        let local = LocalEnv::build(&DeployConfig::local_dev(), "polygon_local", dev::setup_dev_signers(2).await)
            .unwrap();
        let err = local.env.companion(L2).unwrap_err();
        assert!(matches!(err, DeployError::UnknownCompanion { tag, network } if tag == L2 && network == "polygon_local"));
    }

    #[tokio::test]
    async fn test_env_for_companion_shares_contexts() {
        let local = LocalEnv::build(&DeployConfig::local_dev(), "polygon_local", dev::setup_dev_signers(2).await)
            .unwrap();
        let l1_env = local.env_for("ethereum_local").unwrap();

        assert_eq!(l1_env.network().name(), "ethereum_local");
        assert!(std::ptr::eq(l1_env.companion(L2).unwrap(), local.env.network()));
        assert!(matches!(local.env_for("mumbai"), Err(DeployError::UnknownNetwork(_))));
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let err = LocalEnv::build(&DeployConfig::local_dev(), "mumbai", dev::setup_dev_signers(1).await)
            .unwrap_err();
        assert!(matches!(err, DeployError::UnknownNetwork(_)));
    }
}
