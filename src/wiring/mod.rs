//! Idempotent Cross-Chain Endpoint Wiring
//!
//! Two contracts on different networks each hold the other's address in a
//! configuration slot. Wiring reads both slots and only writes the ones that
//! differ, so re-running it after any partial failure converges:
//!
//! ```text
//!   remote slot (e.g. LandTunnel.fxChildTunnel)        ← local address
//!   local slot  (e.g. PolygonLandTunnel.fxRootTunnel)  ← remote address
//! ```
//!
//! The remote direction is written first. A write whose signer is not
//! controlled by this run is deferred rather than failed; see [`PendingCall`].

pub mod pending;

pub use pending::{write_deferred_file, DeferredCalls, PendingCall, WriteOutcome};

use alloy_primitives::Address;
use tracing::{debug, info};

use crate::chain::Receipt;
use crate::errors::DeployError;
use crate::network::{NetworkContext, TxOptions};

/// Which account is authorised to write a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerRole {
    /// A named account of the slot's network
    Named(String),
    Fixed(Address),
    /// The address returned by a getter on the same contract (e.g. `getAdmin`)
    ReadFrom(String),
}

impl SignerRole {
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    pub fn read_from(getter: &str) -> Self {
        Self::ReadFrom(getter.to_string())
    }

    /// Resolve to an address at the time of the write.
    pub async fn resolve(&self, ctx: &NetworkContext, contract: &str) -> Result<Address, DeployError> {
        match self {
            Self::Named(name) => ctx.named_account(name),
            Self::Fixed(address) => Ok(*address),
            Self::ReadFrom(getter) => ctx.read_address(contract, getter).await,
        }
    }
}

/// A configuration slot holding a counterpart's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    /// Logical name of the contract owning the slot
    pub contract: String,
    pub getter: String,
    /// Single-address setter, e.g. `setFxRootTunnel`
    pub setter: String,
    pub signer: SignerRole,
}

impl SlotBinding {
    pub fn new(contract: &str, getter: &str, setter: &str, signer: SignerRole) -> Self {
        Self {
            contract: contract.to_string(),
            getter: getter.to_string(),
            setter: setter.to_string(),
            signer,
        }
    }
}

/// One side of an endpoint pair.
#[derive(Debug, Clone)]
pub struct Endpoint<'a> {
    pub ctx: &'a NetworkContext,
    pub binding: SlotBinding,
}

impl<'a> Endpoint<'a> {
    pub fn new(ctx: &'a NetworkContext, binding: SlotBinding) -> Self {
        Self { ctx, binding }
    }
}

/// What happened to one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionOutcome {
    /// Slot already held the target
    Unchanged,
    Executed(Receipt),
    Deferred(PendingCall),
}

impl DirectionOutcome {
    /// Whether a transaction was mined for this slot
    pub fn wrote(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn pending(&self) -> Option<&PendingCall> {
        match self {
            Self::Deferred(call) => Some(call),
            _ => None,
        }
    }
}

impl From<WriteOutcome> for DirectionOutcome {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Executed(receipt) => Self::Executed(receipt),
            WriteOutcome::Deferred(call) => Self::Deferred(call),
        }
    }
}

/// Result of wiring an endpoint pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringOutcome {
    /// The remote contract is not deployed yet; nothing was written
    NotReady { contract: String, network: String },
    Wired { remote: DirectionOutcome, local: DirectionOutcome },
}

impl WiringOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Wired { .. })
    }

    /// Number of transactions mined
    pub fn writes(&self) -> usize {
        match self {
            Self::NotReady { .. } => 0,
            Self::Wired { remote, local } => [remote, local].iter().filter(|d| d.wrote()).count(),
        }
    }

    pub fn deferred(&self) -> Vec<&PendingCall> {
        match self {
            Self::NotReady { .. } => Vec::new(),
            Self::Wired { remote, local } => remote.pending().into_iter().chain(local.pending()).collect(),
        }
    }
}

/// Make `binding`'s slot on `ctx` hold `target`, writing only when it differs.
pub async fn ensure_slot(
    ctx: &NetworkContext,
    binding: &SlotBinding,
    target: Address,
) -> Result<DirectionOutcome, DeployError> {
    let current = ctx.read_address(&binding.contract, &binding.getter).await?;
    if current == target {
        debug!(
            network = %ctx.name(),
            contract = %binding.contract,
            slot = %binding.getter,
            %target,
            "Slot already set"
        );
        return Ok(DirectionOutcome::Unchanged);
    }

    let from = binding.signer.resolve(ctx, &binding.contract).await?;
    info!(
        network = %ctx.name(),
        contract = %binding.contract,
        setter = %binding.setter,
        %current,
        %target,
        %from,
        "Updating slot"
    );

    let outcome = ctx
        .execute_or_defer(&binding.contract, TxOptions::new(from).log(), &binding.setter, vec![target.into()])
        .await?;
    Ok(outcome.into())
}

/// Point `local` and `remote` at each other.
///
/// The local contract must be deployed. When the remote one is not, nothing is
/// written and [`WiringOutcome::NotReady`] is returned; the step deploying the
/// remote side completes the pair later.
pub async fn wire_endpoints(
    local: &Endpoint<'_>,
    remote: &Endpoint<'_>,
) -> Result<WiringOutcome, DeployError> {
    let local_record = local.ctx.get(&local.binding.contract).await?;

    let Some(remote_record) = remote.ctx.get_or_null(&remote.binding.contract).await? else {
        info!(
            network = %remote.ctx.name(),
            contract = %remote.binding.contract,
            "Counterpart not deployed yet, skipping wiring"
        );
        return Ok(WiringOutcome::NotReady {
            contract: remote.binding.contract.clone(),
            network: remote.ctx.name().to_string(),
        });
    };

    let remote_outcome = ensure_slot(remote.ctx, &remote.binding, local_record.address).await?;
    let local_outcome = ensure_slot(local.ctx, &local.binding, remote_record.address).await?;

    Ok(WiringOutcome::Wired { remote: remote_outcome, local: local_outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{calldata, ContractValue};
    use crate::chain::StateReader;
    use crate::constants::{DEPLOYER, L1, LAND_ADMIN};
    use crate::network::{DeployConfig, DeployOptions, LocalEnv};
    use crate::signer::dev;

    /// Tunnel pair on fresh local chains. Dev keys `0..dev_keys` are controlled;
    /// with one key the land admin is not.
    async fn setup(dev_keys: usize) -> LocalEnv {
        LocalEnv::build(&DeployConfig::local_dev(), "polygon_local", dev::setup_dev_signers(dev_keys).await)
            .unwrap()
    }

    async fn deploy(ctx: &NetworkContext, name: &str, args: Vec<ContractValue>) -> Address {
        deploy_as(ctx, name, name, args).await
    }

    async fn deploy_as(ctx: &NetworkContext, name: &str, contract: &str, args: Vec<ContractValue>) -> Address {
        let deployer = ctx.named_account(DEPLOYER).unwrap();
        ctx.deploy(name, DeployOptions::new(deployer).contract(contract).args(args))
            .await
            .unwrap()
            .address()
    }

    async fn deploy_land(ctx: &NetworkContext) -> Address {
        let admin = ctx.named_account(LAND_ADMIN).unwrap();
        deploy_as(ctx, "PolygonLand", "PolygonLandV2", vec![Address::ZERO.into(), admin.into()]).await
    }

    async fn deploy_child(ctx: &NetworkContext) -> Address {
        let zero = ContractValue::Address(Address::ZERO);
        deploy(
            ctx,
            "PolygonLandTunnel",
            vec![
                zero.clone(),
                zero.clone(),
                zero,
                500u64.into(),
                144u64.into(),
                ContractValue::uints(&[5, 10, 20, 90, 340]),
            ],
        )
        .await
    }

    async fn deploy_root(ctx: &NetworkContext) -> Address {
        let zero = ContractValue::Address(Address::ZERO);
        deploy(ctx, "LandTunnel", vec![zero.clone(), zero.clone(), zero.clone(), zero]).await
    }

    fn child(ctx: &NetworkContext) -> Endpoint<'_> {
        Endpoint::new(
            ctx,
            SlotBinding::new("PolygonLandTunnel", "fxRootTunnel", "setFxRootTunnel", SignerRole::named(DEPLOYER)),
        )
    }

    fn root(ctx: &NetworkContext) -> Endpoint<'_> {
        Endpoint::new(
            ctx,
            SlotBinding::new("LandTunnel", "fxChildTunnel", "setFxChildTunnel", SignerRole::named(DEPLOYER)),
        )
    }

    async fn slot(ctx: &NetworkContext, name: &str, getter: &str) -> Address {
        ctx.read_address(name, getter).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_pair_converges() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        let child_addr = deploy_child(l2).await;
        let root_addr = deploy_root(l1).await;

        let outcome = wire_endpoints(&child(l2), &root(l1)).await.unwrap();

        assert_eq!(outcome.writes(), 2);
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, root_addr);
        assert_eq!(slot(l1, "LandTunnel", "fxChildTunnel").await, child_addr);
    }

    #[tokio::test]
    async fn test_second_run_writes_nothing() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_child(l2).await;
        deploy_root(l1).await;
        wire_endpoints(&child(l2), &root(l1)).await.unwrap();
        let before = local.chain("polygon_local").unwrap().receipts().await.len()
            + local.chain("ethereum_local").unwrap().receipts().await.len();

        let outcome = wire_endpoints(&child(l2), &root(l1)).await.unwrap();

        assert_eq!(
            outcome,
            WiringOutcome::Wired { remote: DirectionOutcome::Unchanged, local: DirectionOutcome::Unchanged }
        );
        let after = local.chain("polygon_local").unwrap().receipts().await.len()
            + local.chain("ethereum_local").unwrap().receipts().await.len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_remote_missing_is_not_ready() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_child(l2).await;
        let receipts = local.chain("polygon_local").unwrap().receipts().await.len();

        let outcome = wire_endpoints(&child(l2), &root(l1)).await.unwrap();

        assert_eq!(
            outcome,
            WiringOutcome::NotReady { contract: "LandTunnel".to_string(), network: "ethereum_local".to_string() }
        );
        assert!(!outcome.is_ready());
        assert_eq!(local.chain("polygon_local").unwrap().receipts().await.len(), receipts);
        assert!(local.chain("ethereum_local").unwrap().receipts().await.is_empty());
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, Address::ZERO);
    }

    #[tokio::test]
    async fn test_local_missing_is_fatal() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_root(l1).await;

        let err = wire_endpoints(&child(l2), &root(l1)).await.unwrap_err();
        assert!(matches!(err, DeployError::NotFound { name, network } if name == "PolygonLandTunnel" && network == "polygon_local"));
    }

    #[tokio::test]
    async fn test_second_side_completes_pair() {
        // L2 deployed first, L1 arrives later and wires from its own side.
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        let child_addr = deploy_child(l2).await;
        assert!(!wire_endpoints(&child(l2), &root(l1)).await.unwrap().is_ready());

        let root_addr = deploy_root(l1).await;
        let outcome = wire_endpoints(&root(l1), &child(l2)).await.unwrap();

        assert_eq!(outcome.writes(), 2);
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, root_addr);
        assert_eq!(slot(l1, "LandTunnel", "fxChildTunnel").await, child_addr);
    }

    #[tokio::test]
    async fn test_only_differing_direction_written() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        let child_addr = deploy_child(l2).await;
        deploy_root(l1).await;
        let root_chain = local.chain("ethereum_local").unwrap();
        let root_addr = l1.get("LandTunnel").await.unwrap().address;
        root_chain
            .set_field(root_addr, "fxChildTunnel", ContractValue::Address(child_addr))
            .await
            .unwrap();

        let outcome = wire_endpoints(&child(l2), &root(l1)).await.unwrap();

        match outcome {
            WiringOutcome::Wired { remote, local } => {
                assert!(remote.is_unchanged());
                assert!(local.wrote());
            }
            other => panic!("Expected Wired, got {other:?}"),
        }
        assert!(root_chain.calls_to(root_addr).await.is_empty());
    }

    #[tokio::test]
    async fn test_external_change_is_repaired() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_child(l2).await;
        let root_addr = deploy_root(l1).await;
        wire_endpoints(&child(l2), &root(l1)).await.unwrap();

        let child_addr = l2.get("PolygonLandTunnel").await.unwrap().address;
        local
            .chain("polygon_local")
            .unwrap()
            .set_field(child_addr, "fxRootTunnel", ContractValue::Address(Address::repeat_byte(0xee)))
            .await
            .unwrap();

        let outcome = wire_endpoints(&child(l2), &root(l1)).await.unwrap();
        assert_eq!(outcome.writes(), 1);
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, root_addr);
    }

    #[tokio::test]
    async fn test_remote_revert_aborts_before_local() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_child(l2).await;
        deploy_root(l1).await;
        local
            .chain("ethereum_local")
            .unwrap()
            .fail_next("setFxChildTunnel", "FxBaseRootTunnel: CHILD_TUNNEL_ALREADY_SET")
            .await;

        let err = wire_endpoints(&child(l2), &root(l1)).await.unwrap_err();
        assert!(err.is_revert());
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, Address::ZERO);

        let retry = wire_endpoints(&child(l2), &root(l1)).await.unwrap();
        assert_eq!(retry.writes(), 2);
    }

    #[tokio::test]
    async fn test_local_revert_after_remote_write_converges_on_rerun() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let l1 = local.env.companion(L1).unwrap();
        deploy_child(l2).await;
        let root_addr = deploy_root(l1).await;
        local.chain("polygon_local").unwrap().fail_next("setFxRootTunnel", "out of gas").await;

        assert!(wire_endpoints(&child(l2), &root(l1)).await.unwrap_err().is_revert());

        let retry = wire_endpoints(&child(l2), &root(l1)).await.unwrap();
        match retry {
            WiringOutcome::Wired { remote, local } => {
                assert!(remote.is_unchanged());
                assert!(local.wrote());
            }
            other => panic!("Expected Wired, got {other:?}"),
        }
        assert_eq!(slot(l2, "PolygonLandTunnel", "fxRootTunnel").await, root_addr);
    }

    #[tokio::test]
    async fn test_uncontrolled_admin_defers_token_slot() {
        let local = setup(1).await;
        let l2 = local.env.network();
        let admin = l2.named_account(LAND_ADMIN).unwrap();
        let land = deploy_land(l2).await;
        let tunnel = deploy_child(l2).await;
        let binding =
            SlotBinding::new("PolygonLand", "polygonLandTunnel", "setPolygonLandTunnel", SignerRole::read_from("getAdmin"));

        let outcome = ensure_slot(l2, &binding, tunnel).await.unwrap();

        let call = outcome.pending().unwrap();
        assert_eq!(call.from, admin);
        assert_eq!(call.to, land);
        assert_eq!(call.data, calldata("setPolygonLandTunnel", &[tunnel.into()]));
        assert_eq!(l2.deferred_calls().await, vec![call.clone()]);
        assert!(local.chain("polygon_local").unwrap().calls_to(land).await.is_empty());
    }

    #[tokio::test]
    async fn test_controlled_admin_executes_token_slot() {
        let local = setup(2).await;
        let l2 = local.env.network();
        let admin = l2.named_account(LAND_ADMIN).unwrap();
        let land = deploy_land(l2).await;
        let tunnel = deploy_child(l2).await;
        let binding =
            SlotBinding::new("PolygonLand", "polygonLandTunnel", "setPolygonLandTunnel", SignerRole::read_from("getAdmin"));

        let outcome = ensure_slot(l2, &binding, tunnel).await.unwrap();

        assert_eq!(executed_by(&outcome), Some(admin));
        let chain = local.chain("polygon_local").unwrap();
        assert_eq!(chain.read(land, "polygonLandTunnel", &[]).await.unwrap(), ContractValue::Address(tunnel));
        assert!(ensure_slot(l2, &binding, tunnel).await.unwrap().is_unchanged());
    }

    fn executed_by(outcome: &DirectionOutcome) -> Option<Address> {
        match outcome {
            DirectionOutcome::Executed(receipt) => Some(receipt.from),
            _ => None,
        }
    }
}
