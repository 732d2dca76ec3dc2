use async_trait::async_trait;

use super::{child_tunnel_slot, polygon_land_slot, root_tunnel_slot, skip_unless_testnet_layer};
use crate::abi::ContractValue;
use crate::constants::{
    DEPLOYER, FXCHILD, L1, MAX_ALLOWED_QUADS, MAX_GAS_LIMIT, POLYGON_LAND, POLYGON_LAND_TUNNEL, QUAD_LIMITS,
    TRUSTED_FORWARDER,
};
use crate::deploy::DeployStep;
use crate::errors::DeployError;
use crate::network::{DeployEnv, DeployOptions, NetworkConfig};
use crate::output;
use crate::wiring::{ensure_slot, wire_endpoints, Endpoint, WiringOutcome};

/// Deploys the L2 tunnel, pairs it with the L1 `LandTunnel` when that exists
/// and makes `PolygonLand` trust it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonLandTunnelStep;

#[async_trait]
impl DeployStep for PolygonLandTunnelStep {
    fn id(&self) -> &str {
        POLYGON_LAND_TUNNEL
    }

    fn tags(&self) -> &[&'static str] {
        &[POLYGON_LAND_TUNNEL, "PolygonLandTunnel_deploy", "L2"]
    }

    fn dependencies(&self) -> &[&'static str] {
        &[POLYGON_LAND, FXCHILD]
    }

    fn skip(&self, config: &NetworkConfig) -> bool {
        skip_unless_testnet_layer(config, "L2")
    }

    async fn run(&self, env: &DeployEnv) -> Result<(), DeployError> {
        let ctx = env.network();
        let deployer = ctx.named_account(DEPLOYER)?;

        let forwarder = ctx.get(TRUSTED_FORWARDER).await?;
        let fx_child = ctx.get(FXCHILD).await?;
        let polygon_land = ctx.get(POLYGON_LAND).await?;

        let tunnel = ctx
            .deploy(
                POLYGON_LAND_TUNNEL,
                DeployOptions::new(deployer)
                    .args(vec![
                        fx_child.address.into(),
                        polygon_land.address.into(),
                        forwarder.address.into(),
                        MAX_GAS_LIMIT.into(),
                        MAX_ALLOWED_QUADS.into(),
                        ContractValue::uints(&QUAD_LIMITS),
                    ])
                    .skip_if_already_deployed()
                    .log(),
            )
            .await?;

        let l1 = env.companion(L1)?;
        let outcome = wire_endpoints(&Endpoint::new(ctx, child_tunnel_slot()), &Endpoint::new(l1, root_tunnel_slot()))
            .await?;
        if let WiringOutcome::NotReady { contract, network } = &outcome {
            output::print_not_ready(contract, network);
        }

        ensure_slot(ctx, &polygon_land_slot(), tunnel.address()).await?;
        Ok(())
    }
}
