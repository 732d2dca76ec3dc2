use alloy_primitives::Address;
use std::sync::Arc;
use tracing::debug;

use super::handle::ContractHandle;
use crate::abi::ContractValue;
use crate::constants::{
    ASSET_ADMIN, CHILD_GAME_TOKEN, DEPLOYER, GAME_TOKEN_ADMIN, MOCK_ERC1155_ASSET, MOCK_ERC721_ASSET,
    TRUSTED_FORWARDER,
};
use crate::deploy::DeployRunner;
use crate::errors::DeployError;
use crate::network::{DeployConfig, LocalEnv, NetworkContext};
use crate::signer::dev;

/// Network the game fixtures run on
const GAME_NETWORK: &str = "polygon_local";

/// An account with the game token connected to it.
#[derive(Debug, Clone)]
pub struct User {
    pub address: Address,
    pub game: ContractHandle,
}

/// Deployed game token with its actors, on a fresh local network.
#[derive(Debug, Clone)]
pub struct GameFixtures {
    pub game_token: ContractHandle,
    pub game_token_as_admin: ContractHandle,
    pub game_token_as_minter: ContractHandle,
    pub asset_admin: Address,
    pub game_owner: User,
    pub game_editor1: User,
    pub game_editor2: User,
    /// Every unnamed account
    pub users: Vec<User>,
    pub trusted_forwarder: ContractHandle,
    pub env: LocalEnv,
}

impl GameFixtures {
    /// Deploy the game token and its mocks on a fresh network and approve the
    /// game token on both assets for the game owner.
    pub async fn setup() -> Result<Self, DeployError> {
        let signers = dev::setup_dev_signers(dev::DEV_PRIVATE_KEYS.len()).await;
        let env = LocalEnv::build(&DeployConfig::local_dev(), GAME_NETWORK, signers)?;
        DeployRunner::with_default_steps()
            .run(&env.env, &[CHILD_GAME_TOKEN.to_string()])
            .await?;

        let ctx = game_network(&env)?;
        let deployer = ctx.named_account(DEPLOYER)?;
        let game_token_admin = ctx.named_account(GAME_TOKEN_ADMIN)?;
        let asset_admin = ctx.named_account(ASSET_ADMIN)?;

        let game_token = ContractHandle::at(ctx.clone(), CHILD_GAME_TOKEN, deployer).await?;
        let trusted_forwarder = ContractHandle::at(ctx.clone(), TRUSTED_FORWARDER, deployer).await?;

        let users: Vec<User> = ctx
            .unnamed_accounts()
            .iter()
            .map(|&address| User { address, game: game_token.connect(address) })
            .collect();
        if users.len() < 3 {
            return Err(DeployError::NotEnoughAccounts { needed: 3, available: users.len() });
        }
        let game_owner = users[0].clone();
        let game_editor1 = users[1].clone();
        let game_editor2 = users[2].clone();

        for asset in [MOCK_ERC1155_ASSET, MOCK_ERC721_ASSET] {
            ContractHandle::at(ctx.clone(), asset, game_owner.address)
                .await?
                .execute(
                    "setApprovalForAll",
                    vec![game_token.address().into(), ContractValue::Bool(true)],
                )
                .await?;
        }
        debug!(owner = %game_owner.address, "Game owner approved game token on assets");

        Ok(Self {
            game_token_as_admin: game_token.connect(game_token_admin),
            game_token_as_minter: game_token.connect(game_token_admin),
            game_token,
            asset_admin,
            game_owner,
            game_editor1,
            game_editor2,
            users,
            trusted_forwarder,
            env,
        })
    }

    /// [`setup`](Self::setup), then make the game token admin the minter.
    pub async fn with_admin_game_minter() -> Result<Self, DeployError> {
        let fixtures = Self::setup().await?;
        fixtures.make_admin_minter().await?;
        Ok(fixtures)
    }

    /// [`setup`](Self::setup), then hand both assets to the game owner and
    /// make the game token admin the minter.
    pub async fn with_game_owner_minter() -> Result<Self, DeployError> {
        let fixtures = Self::setup().await?;
        let ctx = fixtures.network()?;
        for asset in [MOCK_ERC1155_ASSET, MOCK_ERC721_ASSET] {
            ContractHandle::at(ctx.clone(), asset, fixtures.asset_admin)
                .await?
                .execute("transferOwnership", vec![fixtures.game_owner.address.into()])
                .await?;
        }
        fixtures.make_admin_minter().await?;
        Ok(fixtures)
    }

    /// Context of the game network
    pub fn network(&self) -> Result<Arc<NetworkContext>, DeployError> {
        game_network(&self.env)
    }

    async fn make_admin_minter(&self) -> Result<(), DeployError> {
        let admin = self.game_token_as_admin.signer();
        self.game_token_as_admin.execute("changeMinter", vec![admin.into()]).await?;
        Ok(())
    }
}

fn game_network(env: &LocalEnv) -> Result<Arc<NetworkContext>, DeployError> {
    env.context(GAME_NETWORK)
}
