//! Shipped deploy steps.

pub mod game_token;
pub mod land_tunnel;
pub mod mocks;
pub mod polygon_land_tunnel;

pub use game_token::ChildGameTokenStep;
pub use land_tunnel::LandTunnelStep;
pub use mocks::MockStep;
pub use polygon_land_tunnel::PolygonLandTunnelStep;

use super::DeployStep;
use crate::constants::{DEPLOYER, LAND_TUNNEL, POLYGON_LAND, POLYGON_LAND_TUNNEL};
use crate::network::NetworkConfig;
use crate::wiring::{SignerRole, SlotBinding};

/// Every step in registration order: mocks first, then the tunnels and the game token.
pub fn default_steps() -> Vec<Box<dyn DeployStep>> {
    let mut steps: Vec<Box<dyn DeployStep>> = mocks::MOCKS
        .iter()
        .map(|mock| Box::new(mock.clone()) as Box<dyn DeployStep>)
        .collect();
    steps.push(Box::new(LandTunnelStep));
    steps.push(Box::new(PolygonLandTunnelStep));
    steps.push(Box::new(ChildGameTokenStep));
    steps
}

/// Skip unless the network is a testnet carrying the `layer` tag (`L1`, `L2`).
pub(crate) fn skip_unless_testnet_layer(config: &NetworkConfig, layer: &str) -> bool {
    crate::network::skip_unless_testnet(config) || !config.has_tag(layer)
}

/// `PolygonLandTunnel.fxRootTunnel`, owned by the L2 deployer
pub fn child_tunnel_slot() -> SlotBinding {
    SlotBinding::new(POLYGON_LAND_TUNNEL, "fxRootTunnel", "setFxRootTunnel", SignerRole::named(DEPLOYER))
}

/// `LandTunnel.fxChildTunnel`, owned by the L1 deployer
pub fn root_tunnel_slot() -> SlotBinding {
    SlotBinding::new(LAND_TUNNEL, "fxChildTunnel", "setFxChildTunnel", SignerRole::named(DEPLOYER))
}

/// `PolygonLand.polygonLandTunnel`, written by whoever `getAdmin` returns
pub fn polygon_land_slot() -> SlotBinding {
    SlotBinding::new(
        POLYGON_LAND,
        "polygonLandTunnel",
        "setPolygonLandTunnel",
        SignerRole::read_from("getAdmin"),
    )
}
