use async_trait::async_trait;

use crate::abi::ContractValue;
use crate::constants::{
    ASSET_ADMIN, CHECKPOINT_MANAGER, DEPLOYER, FXCHILD, FXROOT, LAND, LAND_ADMIN, MOCK_ERC1155_ASSET,
    MOCK_ERC721_ASSET, POLYGON_LAND, TRUSTED_FORWARDER,
};
use crate::deploy::DeployStep;
use crate::errors::DeployError;
use crate::network::{skip_unless_testnet, DeployEnv, DeployOptions, NetworkConfig};

/// Constructor argument of a mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockArg {
    /// Address of another deployment on the same network
    Deployment(&'static str),
    /// A named account
    Named(&'static str),
}

/// Deploys a stand-in contract on test networks, once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStep {
    pub name: &'static str,
    pub contract: &'static str,
    /// Named account deploying (and owning) the mock
    pub deployer: &'static str,
    /// Network layer tag the mock belongs to, `None` for both
    pub layer: Option<&'static str>,
    pub tags: &'static [&'static str],
    /// Deployments referenced by `args`
    pub dependencies: &'static [&'static str],
    pub args: &'static [MockArg],
}

pub const MOCKS: &[MockStep] = &[
    MockStep {
        name: TRUSTED_FORWARDER,
        contract: "TestMetaTxForwarder",
        deployer: DEPLOYER,
        layer: None,
        tags: &[TRUSTED_FORWARDER],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: FXCHILD,
        contract: "FakeFxChild",
        deployer: DEPLOYER,
        layer: Some("L2"),
        tags: &[FXCHILD],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: FXROOT,
        contract: "FakeFxRoot",
        deployer: DEPLOYER,
        layer: Some("L1"),
        tags: &[FXROOT],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: CHECKPOINT_MANAGER,
        contract: "FakeCheckpointManager",
        deployer: DEPLOYER,
        layer: Some("L1"),
        tags: &[CHECKPOINT_MANAGER],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: MOCK_ERC1155_ASSET,
        contract: "MockERC1155Asset",
        deployer: ASSET_ADMIN,
        layer: Some("L2"),
        tags: &[MOCK_ERC1155_ASSET],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: MOCK_ERC721_ASSET,
        contract: "MockERC721Asset",
        deployer: ASSET_ADMIN,
        layer: Some("L2"),
        tags: &[MOCK_ERC721_ASSET],
        dependencies: &[],
        args: &[],
    },
    MockStep {
        name: POLYGON_LAND,
        contract: "PolygonLandV2",
        deployer: DEPLOYER,
        layer: Some("L2"),
        tags: &[POLYGON_LAND, "PolygonLand_deploy", "L2"],
        dependencies: &[TRUSTED_FORWARDER],
        args: &[MockArg::Deployment(TRUSTED_FORWARDER), MockArg::Named(LAND_ADMIN)],
    },
    MockStep {
        name: LAND,
        contract: "Land",
        deployer: DEPLOYER,
        layer: Some("L1"),
        tags: &[LAND, "Land_deploy", "L1"],
        dependencies: &[TRUSTED_FORWARDER],
        args: &[MockArg::Deployment(TRUSTED_FORWARDER), MockArg::Named(LAND_ADMIN)],
    },
];

#[async_trait]
impl DeployStep for MockStep {
    fn id(&self) -> &str {
        self.name
    }

    fn tags(&self) -> &[&'static str] {
        self.tags
    }

    fn dependencies(&self) -> &[&'static str] {
        self.dependencies
    }

    fn skip(&self, config: &NetworkConfig) -> bool {
        skip_unless_testnet(config) || self.layer.is_some_and(|layer| !config.has_tag(layer))
    }

    async fn run(&self, env: &DeployEnv) -> Result<(), DeployError> {
        let ctx = env.network();
        let mut args = Vec::with_capacity(self.args.len());
        for arg in self.args {
            let address = match *arg {
                MockArg::Deployment(name) => ctx.get(name).await?.address,
                MockArg::Named(name) => ctx.named_account(name)?,
            };
            args.push(ContractValue::Address(address));
        }

        let from = ctx.named_account(self.deployer)?;
        ctx.deploy(
            self.name,
            DeployOptions::new(from).contract(self.contract).args(args).skip_if_already_deployed().log(),
        )
        .await?;
        Ok(())
    }
}
