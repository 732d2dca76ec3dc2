use alloy_primitives::{keccak256, Address};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::{Mutex, RwLock};

use super::catalog::{approval_key, Blueprint, ContractCatalog, Effect, Guard};
use super::errors::ChainError;
use super::state::{ChainState, ContractAccount};
use super::{Receipt, StateReader, StateWriter};
use crate::abi::ContractValue;
use crate::signer::{SignedTransaction, TxKind};

/// A revert queued by a test for the next matching transaction.
#[derive(Debug, Clone)]
struct InjectedRevert {
    /// Method name, or contract type for creations
    target: String,
    reason: String,
}

/// In-process chain that executes deploy transactions against a [`ContractCatalog`].
///
/// Every transaction must carry a signature that recovers to its `from`
/// account. Contract addresses are derived from sender and nonce exactly like
/// CREATE, so redeploying on a fresh chain gives the same addresses.
#[derive(Debug)]
pub struct LocalChain {
    chain_id: u64,
    catalog: ContractCatalog,
    state: RwLock<ChainState>,
    injected: Mutex<Vec<InjectedRevert>>,
}

impl LocalChain {
    /// Fresh chain with the builtin catalog
    pub fn new(chain_id: u64) -> Self {
        Self::from_state(ChainState::new(chain_id))
    }

    /// Resume from a previously saved state
    pub fn from_state(state: ChainState) -> Self {
        Self {
            chain_id: state.chain_id,
            catalog: ContractCatalog::builtin(),
            state: RwLock::new(state),
            injected: Mutex::new(Vec::new()),
        }
    }

    /// Load the state file at `path`, or start empty when it does not exist.
    pub async fn load_or_new(path: &Path, chain_id: u64) -> Result<Self, ChainError> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            let state = ChainState::load(path).await?;
            if state.chain_id != chain_id {
                return Err(ChainError::ChainIdMismatch { expected: chain_id, got: state.chain_id });
            }
            Ok(Self::from_state(state))
        } else {
            Ok(Self::new(chain_id))
        }
    }

    /// Persist the current state
    pub async fn save(&self, path: &Path) -> Result<(), ChainError> {
        self.state.read().await.save(path).await
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ChainState {
        self.state.read().await.clone()
    }

    /// All mined transactions
    pub async fn receipts(&self) -> Vec<Receipt> {
        self.state.read().await.receipts.clone()
    }

    /// Mined method calls against `to` (creations excluded)
    pub async fn calls_to(&self, to: Address) -> Vec<Receipt> {
        self.state
            .read()
            .await
            .receipts
            .iter()
            .filter(|r| r.to == Some(to))
            .cloned()
            .collect()
    }

    /// Make the next transaction calling `method` (or creating contract type
    /// `method`) revert with `reason`.
    pub async fn fail_next(&self, method: &str, reason: &str) {
        self.injected.lock().await.push(InjectedRevert {
            target: method.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Overwrite a stored field directly, bypassing guards.
    ///
    /// Stands in for an external actor changing contract state between runs.
    pub async fn set_field(
        &self,
        contract: Address,
        field: &str,
        value: ContractValue,
    ) -> Result<(), ChainError> {
        let mut state = self.state.write().await;
        let account = state.contracts.get_mut(&contract).ok_or(ChainError::NoContract(contract))?;
        account.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn blueprint(&self, contract: &str) -> Option<&Blueprint> {
        self.catalog.get(contract)
    }

    async fn take_injected(&self, target: &str) -> Option<String> {
        let mut injected = self.injected.lock().await;
        let index = injected.iter().position(|r| r.target == target)?;
        Some(injected.remove(index).reason)
    }

    fn create(
        &self,
        state: &mut ChainState,
        from: Address,
        contract: &str,
        args: &[ContractValue],
    ) -> Result<Address, ChainError> {
        let blueprint = self
            .blueprint(contract)
            .ok_or_else(|| ChainError::reverted(None, contract, "unknown contract type"))?;

        if args.len() != blueprint.constructor.len() {
            return Err(ChainError::reverted(
                None,
                contract,
                format!(
                    "constructor expects {} arguments, got {}",
                    blueprint.constructor.len(),
                    args.len()
                ),
            ));
        }

        let mut fields: BTreeMap<String, ContractValue> = blueprint
            .constructor
            .iter()
            .zip(args)
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        if let Some(owner) = blueprint.owner_field {
            fields.insert(owner.to_string(), ContractValue::Address(from));
        }

        let nonce = state.nonces.get(&from).copied().unwrap_or(0);
        let address = from.create(nonce);
        state
            .contracts
            .insert(address, ContractAccount { contract: contract.to_string(), fields });
        Ok(address)
    }

    fn call(
        &self,
        state: &mut ChainState,
        from: Address,
        to: Address,
        method: &str,
        args: &[ContractValue],
    ) -> Result<(), ChainError> {
        let account = state.contracts.get_mut(&to).ok_or(ChainError::NoContract(to))?;
        let blueprint = self
            .blueprint(&account.contract)
            .ok_or_else(|| ChainError::reverted(Some(to), method, "unknown contract type"))?;
        let spec = blueprint
            .method(method)
            .ok_or_else(|| ChainError::reverted(Some(to), method, "function selector was not recognized"))?;

        if let Guard::Field(field) = spec.guard {
            let authorized = account.fields.get(field).and_then(ContractValue::as_address);
            if authorized != Some(from) {
                return Err(ChainError::reverted(
                    Some(to),
                    method,
                    format!("{}: caller is not the {field}", blueprint.name),
                ));
            }
        }

        match spec.effect {
            Effect::SetAddress(field) => {
                let value = args
                    .first()
                    .and_then(ContractValue::as_address)
                    .ok_or_else(|| ChainError::reverted(Some(to), method, "expected an address argument"))?;
                account.fields.insert(field.to_string(), ContractValue::Address(value));
            }
            Effect::SetApproval(mapping) => {
                let (operator, approved) = match args {
                    [ContractValue::Address(operator), ContractValue::Bool(approved)] => {
                        (*operator, *approved)
                    }
                    _ => {
                        return Err(ChainError::reverted(
                            Some(to),
                            method,
                            "expected (address, bool) arguments",
                        ))
                    }
                };
                let key = approval_key(mapping, &from.to_string(), &operator.to_string());
                account.fields.insert(key, ContractValue::Bool(approved));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StateReader for LocalChain {
    async fn read(
        &self,
        contract: Address,
        field: &str,
        args: &[ContractValue],
    ) -> Result<ContractValue, ChainError> {
        let state = self.state.read().await;
        let account = state.contracts.get(&contract).ok_or(ChainError::NoContract(contract))?;
        let unknown = || ChainError::UnknownField { contract, field: field.to_string() };
        let blueprint = self.blueprint(&account.contract).ok_or_else(unknown)?;
        let field = blueprint.field_for(field);

        if blueprint.is_mapping(field) {
            let key = match args {
                [ContractValue::Address(owner), ContractValue::Address(operator)] => {
                    approval_key(field, &owner.to_string(), &operator.to_string())
                }
                _ => return Err(unknown()),
            };
            return Ok(account.fields.get(&key).cloned().unwrap_or(ContractValue::Bool(false)));
        }

        match account.fields.get(field) {
            Some(value) => Ok(value.clone()),
            None if blueprint.declares(field) => Ok(ContractValue::Address(Address::ZERO)),
            None => Err(unknown()),
        }
    }
}

#[async_trait]
impl StateWriter for LocalChain {
    async fn send(&self, tx: SignedTransaction) -> Result<Receipt, ChainError> {
        let request = &tx.request;
        if request.chain_id != self.chain_id {
            return Err(ChainError::ChainIdMismatch { expected: self.chain_id, got: request.chain_id });
        }

        let signer = tx
            .recover_signer()
            .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;
        if signer != request.from {
            return Err(ChainError::InvalidSignature(format!(
                "signed by {signer}, declared sender {}",
                request.from
            )));
        }

        let (to, target) = match &request.kind {
            TxKind::Call { to, method } => (Some(*to), method.as_str()),
            TxKind::Create { contract } => (None, contract.as_str()),
        };
        if let Some(reason) = self.take_injected(target).await {
            return Err(ChainError::reverted(to, target, reason));
        }

        let mut state = self.state.write().await;
        let contract_address = match &request.kind {
            TxKind::Create { contract } => Some(self.create(&mut state, request.from, contract, &request.args)?),
            TxKind::Call { to, method } => {
                self.call(&mut state, request.from, *to, method, &request.args)?;
                None
            }
        };

        let nonce = state.bump_nonce(request.from);
        state.block_number += 1;

        let mut preimage = tx.hash().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let receipt = Receipt {
            transaction_hash: keccak256(preimage),
            block_number: state.block_number,
            from: request.from,
            to,
            contract_address,
            method: match &request.kind {
                TxKind::Call { method, .. } => Some(method.clone()),
                TxKind::Create { .. } => None,
            },
        };
        state.receipts.push(receipt.clone());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{dev, SignerManager, TransactionRequest};
    use alloy_signer::Signer;
    use std::sync::Arc;

    const CHAIN_ID: u64 = 31337;

    async fn setup() -> (LocalChain, Arc<SignerManager>, Vec<Address>) {
        let signers = dev::setup_dev_signers(3).await;
        let mut accounts = Vec::new();
        for key in dev::DEV_PRIVATE_KEYS.iter().take(3) {
            let signer: alloy_signer_local::PrivateKeySigner = key.parse().unwrap();
            accounts.push(signer.address());
        }
        (LocalChain::new(CHAIN_ID), signers, accounts)
    }

    async fn send(
        chain: &LocalChain,
        signers: &SignerManager,
        request: TransactionRequest,
    ) -> Result<Receipt, ChainError> {
        let signed = signers.sign_transaction(request).await.unwrap();
        chain.send(signed).await
    }

    async fn deploy_tunnel(chain: &LocalChain, signers: &SignerManager, from: Address) -> Address {
        let request = TransactionRequest::create(
            CHAIN_ID,
            from,
            "LandTunnel",
            vec![
                Address::repeat_byte(1).into(),
                Address::repeat_byte(2).into(),
                Address::repeat_byte(3).into(),
                Address::repeat_byte(4).into(),
            ],
        );
        send(chain, signers, request).await.unwrap().contract_address.unwrap()
    }

    #[tokio::test]
    async fn test_create_address_follows_nonce() {
        let (chain, signers, accounts) = setup().await;
        let first = deploy_tunnel(&chain, &signers, accounts[0]).await;
        let second = deploy_tunnel(&chain, &signers, accounts[0]).await;

        assert_eq!(first, accounts[0].create(0));
        assert_eq!(second, accounts[0].create(1));
    }

    #[tokio::test]
    async fn test_owner_guard() {
        let (chain, signers, accounts) = setup().await;
        let tunnel = deploy_tunnel(&chain, &signers, accounts[0]).await;
        let child = Address::repeat_byte(0xcc);

        let by_stranger = TransactionRequest::call(
            CHAIN_ID,
            accounts[1],
            tunnel,
            "setFxChildTunnel",
            vec![child.into()],
        );
        let err = send(&chain, &signers, by_stranger).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted { .. }));

        let by_owner =
            TransactionRequest::call(CHAIN_ID, accounts[0], tunnel, "setFxChildTunnel", vec![child.into()]);
        send(&chain, &signers, by_owner).await.unwrap();

        let value = chain.read(tunnel, "fxChildTunnel", &[]).await.unwrap();
        assert_eq!(value, ContractValue::Address(child));
    }

    #[tokio::test]
    async fn test_unset_declared_field_reads_zero() {
        let (chain, signers, accounts) = setup().await;
        let tunnel = deploy_tunnel(&chain, &signers, accounts[0]).await;

        let value = chain.read(tunnel, "fxChildTunnel", &[]).await.unwrap();
        assert_eq!(value, ContractValue::Address(Address::ZERO));

        let err = chain.read(tunnel, "noSuchField", &[]).await.unwrap_err();
        assert!(matches!(err, ChainError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_forged_signature_rejected() {
        let (chain, signers, accounts) = setup().await;
        let mut signed = signers
            .sign_transaction(TransactionRequest::create(CHAIN_ID, accounts[0], "FakeFxRoot", vec![]))
            .await
            .unwrap();
        signed.request.from = accounts[1];

        let err = chain.send(signed).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignature(_)));
        assert!(chain.receipts().await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_chain_id_rejected() {
        let (chain, signers, accounts) = setup().await;
        let request = TransactionRequest::create(137, accounts[0], "FakeFxRoot", vec![]);
        let err = send(&chain, &signers, request).await.unwrap_err();
        assert!(matches!(err, ChainError::ChainIdMismatch { expected: CHAIN_ID, got: 137 }));
    }

    #[tokio::test]
    async fn test_injected_revert_applies_once() {
        let (chain, signers, accounts) = setup().await;
        let tunnel = deploy_tunnel(&chain, &signers, accounts[0]).await;
        chain.fail_next("setFxChildTunnel", "paused").await;

        let request = || {
            TransactionRequest::call(
                CHAIN_ID,
                accounts[0],
                tunnel,
                "setFxChildTunnel",
                vec![Address::repeat_byte(9).into()],
            )
        };
        let err = send(&chain, &signers, request()).await.unwrap_err();
        match err {
            ChainError::Reverted { reason, .. } => assert_eq!(reason, "paused"),
            other => panic!("Expected revert, got {other:?}"),
        }
        send(&chain, &signers, request()).await.unwrap();
        assert_eq!(chain.calls_to(tunnel).await.len(), 1);
    }

    #[tokio::test]
    async fn test_approval_mapping_keyed_by_caller() {
        let (chain, signers, accounts) = setup().await;
        let request = TransactionRequest::create(CHAIN_ID, accounts[0], "MockERC721Asset", vec![]);
        let asset = send(&chain, &signers, request).await.unwrap().contract_address.unwrap();
        let operator = Address::repeat_byte(0x42);

        let approve = TransactionRequest::call(
            CHAIN_ID,
            accounts[1],
            asset,
            "setApprovalForAll",
            vec![operator.into(), true.into()],
        );
        send(&chain, &signers, approve).await.unwrap();

        let approved = chain
            .read(asset, "isApprovedForAll", &[accounts[1].into(), operator.into()])
            .await
            .unwrap();
        assert_eq!(approved, ContractValue::Bool(true));
        let other = chain
            .read(asset, "isApprovedForAll", &[accounts[0].into(), operator.into()])
            .await
            .unwrap();
        assert_eq!(other, ContractValue::Bool(false));
    }

    #[tokio::test]
    async fn test_constructor_arity_checked() {
        let (chain, signers, accounts) = setup().await;
        let request = TransactionRequest::create(CHAIN_ID, accounts[0], "LandTunnel", vec![]);
        let err = send(&chain, &signers, request).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted { to: None, .. }));
    }

    #[tokio::test]
    async fn test_state_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polygon_local.json");
        let (chain, signers, accounts) = setup().await;
        let tunnel = deploy_tunnel(&chain, &signers, accounts[0]).await;
        chain.save(&path).await.unwrap();

        let restored = LocalChain::load_or_new(&path, CHAIN_ID).await.unwrap();
        assert_eq!(restored.snapshot().await, chain.snapshot().await);
        assert!(restored.read(tunnel, "owner", &[]).await.is_ok());

        let err = LocalChain::load_or_new(&path, 1).await.unwrap_err();
        assert!(matches!(err, ChainError::ChainIdMismatch { .. }));
    }
}
