use async_trait::async_trait;

use super::{child_tunnel_slot, root_tunnel_slot, skip_unless_testnet_layer};
use crate::constants::{CHECKPOINT_MANAGER, DEPLOYER, FXROOT, L2, LAND, LAND_TUNNEL, TRUSTED_FORWARDER};
use crate::deploy::DeployStep;
use crate::errors::DeployError;
use crate::network::{DeployEnv, DeployOptions, NetworkConfig};
use crate::output;
use crate::wiring::{wire_endpoints, Endpoint, WiringOutcome};

/// Deploys the L1 tunnel and pairs it with the L2 `PolygonLandTunnel` when that exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandTunnelStep;

#[async_trait]
impl DeployStep for LandTunnelStep {
    fn id(&self) -> &str {
        LAND_TUNNEL
    }

    fn tags(&self) -> &[&'static str] {
        &[LAND_TUNNEL, "LandTunnel_deploy", "L1"]
    }

    fn dependencies(&self) -> &[&'static str] {
        &[LAND, FXROOT, CHECKPOINT_MANAGER]
    }

    fn skip(&self, config: &NetworkConfig) -> bool {
        skip_unless_testnet_layer(config, "L1")
    }

    async fn run(&self, env: &DeployEnv) -> Result<(), DeployError> {
        let ctx = env.network();
        let deployer = ctx.named_account(DEPLOYER)?;

        let checkpoint_manager = ctx.get(CHECKPOINT_MANAGER).await?;
        let fx_root = ctx.get(FXROOT).await?;
        let land = ctx.get(LAND).await?;
        let forwarder = ctx.get(TRUSTED_FORWARDER).await?;

        ctx.deploy(
            LAND_TUNNEL,
            DeployOptions::new(deployer)
                .args(vec![
                    checkpoint_manager.address.into(),
                    fx_root.address.into(),
                    land.address.into(),
                    forwarder.address.into(),
                ])
                .skip_if_already_deployed()
                .log(),
        )
        .await?;

        let l2 = env.companion(L2)?;
        let outcome = wire_endpoints(&Endpoint::new(ctx, root_tunnel_slot()), &Endpoint::new(l2, child_tunnel_slot()))
            .await?;
        if let WiringOutcome::NotReady { contract, network } = &outcome {
            output::print_not_ready(contract, network);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{POLYGON_LAND, POLYGON_LAND_TUNNEL};
    use crate::deploy::DeployRunner;
    use crate::network::{DeployConfig, LocalEnv};
    use crate::signer::dev;

    /// Both sides over the same chains and registries.
    struct Pair {
        l1: LocalEnv,
        l2: DeployEnv,
    }

    async fn pair() -> Pair {
        let signers = dev::setup_dev_signers(2).await;
        let l1 = LocalEnv::build(&DeployConfig::local_dev(), "ethereum_local", signers).unwrap();
        let l2 = l1.env_for("polygon_local").unwrap();
        Pair { l1, l2 }
    }

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_either_order_converges() {
        let pair = pair().await;
        let runner = DeployRunner::with_default_steps();

        runner.run(&pair.l1.env, &tags(&[LAND_TUNNEL])).await.unwrap();
        runner.run(&pair.l2, &tags(&[POLYGON_LAND_TUNNEL])).await.unwrap();

        let l1 = pair.l1.env.network();
        let l2 = pair.l2.network();
        let root = l1.get(LAND_TUNNEL).await.unwrap().address;
        let child = l2.get(POLYGON_LAND_TUNNEL).await.unwrap().address;
        assert_eq!(l1.read_address(LAND_TUNNEL, "fxChildTunnel").await.unwrap(), child);
        assert_eq!(l2.read_address(POLYGON_LAND_TUNNEL, "fxRootTunnel").await.unwrap(), root);
        assert_eq!(l2.read_address(POLYGON_LAND, "polygonLandTunnel").await.unwrap(), child);
    }

    #[tokio::test]
    async fn test_l1_first_is_not_ready() {
        let pair = pair().await;
        let report = DeployRunner::with_default_steps().run(&pair.l1.env, &tags(&[LAND_TUNNEL])).await.unwrap();

        assert_eq!(
            report.executed,
            vec![TRUSTED_FORWARDER, FXROOT, CHECKPOINT_MANAGER, LAND, LAND_TUNNEL]
        );
        let l1 = pair.l1.env.network();
        assert_eq!(
            l1.read_address(LAND_TUNNEL, "fxChildTunnel").await.unwrap(),
            alloy_primitives::Address::ZERO
        );
    }
}
