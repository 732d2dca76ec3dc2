use async_trait::async_trait;

use super::skip_unless_testnet_layer;
use crate::constants::{
    CHILD_GAME_TOKEN, DEPLOYER, GAME_TOKEN_ADMIN, MOCK_ERC1155_ASSET, MOCK_ERC721_ASSET, TRUSTED_FORWARDER,
};
use crate::deploy::DeployStep;
use crate::errors::DeployError;
use crate::network::{DeployEnv, DeployOptions, NetworkConfig};

/// Deploys the L2 game token over the mock assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildGameTokenStep;

#[async_trait]
impl DeployStep for ChildGameTokenStep {
    fn id(&self) -> &str {
        CHILD_GAME_TOKEN
    }

    fn tags(&self) -> &[&'static str] {
        &[CHILD_GAME_TOKEN, "ChildGameToken_deploy", "L2"]
    }

    fn dependencies(&self) -> &[&'static str] {
        &[TRUSTED_FORWARDER, MOCK_ERC1155_ASSET, MOCK_ERC721_ASSET]
    }

    fn skip(&self, config: &NetworkConfig) -> bool {
        skip_unless_testnet_layer(config, "L2")
    }

    async fn run(&self, env: &DeployEnv) -> Result<(), DeployError> {
        let ctx = env.network();
        let deployer = ctx.named_account(DEPLOYER)?;
        let admin = ctx.named_account(GAME_TOKEN_ADMIN)?;

        let forwarder = ctx.get(TRUSTED_FORWARDER).await?;
        let asset_1155 = ctx.get(MOCK_ERC1155_ASSET).await?;
        let asset_721 = ctx.get(MOCK_ERC721_ASSET).await?;

        ctx.deploy(
            CHILD_GAME_TOKEN,
            DeployOptions::new(deployer)
                .args(vec![
                    forwarder.address.into(),
                    admin.into(),
                    asset_1155.address.into(),
                    asset_721.address.into(),
                ])
                .skip_if_already_deployed()
                .log(),
        )
        .await?;
        Ok(())
    }
}
