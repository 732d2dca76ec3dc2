use alloy_primitives::Address;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::accounts::NamedAccounts;
use super::config::NetworkConfig;
use crate::abi::ContractValue;
use crate::chain::{ChainError, LocalChain, Receipt, StateReader, StateWriter};
use crate::errors::DeployError;
use crate::output;
use crate::registry::{ContractRegistry, DeploymentRecord, MemoryRegistry};
use crate::signer::{SignerError, SignerManager, TransactionRequest};
use crate::wiring::{DeferredCalls, PendingCall, WriteOutcome};

/// Options of a [`NetworkContext::deploy`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Deployer, must be a controlled account
    pub from: Address,
    /// Contract type, defaults to the logical name
    pub contract: Option<String>,
    pub args: Vec<ContractValue>,
    /// Reuse an existing record even when contract or args changed
    pub skip_if_already_deployed: bool,
    /// Print progress to the console
    pub log: bool,
}

impl DeployOptions {
    pub fn new(from: Address) -> Self {
        Self { from, contract: None, args: Vec::new(), skip_if_already_deployed: false, log: false }
    }

    pub fn contract(mut self, contract: &str) -> Self {
        self.contract = Some(contract.to_string());
        self
    }

    pub fn args(mut self, args: Vec<ContractValue>) -> Self {
        self.args = args;
        self
    }

    pub fn skip_if_already_deployed(mut self) -> Self {
        self.skip_if_already_deployed = true;
        self
    }

    pub fn log(mut self) -> Self {
        self.log = true;
        self
    }
}

/// Result of a [`NetworkContext::deploy`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub record: DeploymentRecord,
    /// False when an existing record was reused
    pub newly_deployed: bool,
    /// Creation receipt, only for new deployments
    pub receipt: Option<Receipt>,
}

impl DeployResult {
    pub fn address(&self) -> Address {
        self.record.address
    }
}

/// Options of a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    pub from: Address,
    /// Print progress to the console
    pub log: bool,
}

impl TxOptions {
    pub fn new(from: Address) -> Self {
        Self { from, log: false }
    }

    pub fn log(mut self) -> Self {
        self.log = true;
        self
    }
}

/// Everything a deploy step needs to talk to one network.
///
/// Bundles the registry namespace, the chain reader and writer, the resolved
/// named accounts, the controlled signers and the log of deferred calls.
/// Contexts of different networks are fully independent; a step reaches other
/// networks only through [`DeployEnv::companion`](super::DeployEnv::companion).
pub struct NetworkContext {
    config: NetworkConfig,
    registry: Arc<dyn ContractRegistry>,
    reader: Arc<dyn StateReader>,
    writer: Arc<dyn StateWriter>,
    signers: Arc<SignerManager>,
    accounts: NamedAccounts,
    deferred: DeferredCalls,
}

impl std::fmt::Debug for NetworkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkContext")
            .field("network", &self.config.name)
            .field("chain_id", &self.config.chain_id)
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}

impl NetworkContext {
    pub fn new(
        config: NetworkConfig,
        registry: Arc<dyn ContractRegistry>,
        reader: Arc<dyn StateReader>,
        writer: Arc<dyn StateWriter>,
        signers: Arc<SignerManager>,
    ) -> Result<Self, DeployError> {
        let accounts = NamedAccounts::resolve(&config.named_accounts, &config.account_list())?;
        Ok(Self {
            config,
            registry,
            reader,
            writer,
            signers,
            accounts,
            deferred: DeferredCalls::new(),
        })
    }

    /// Context over a fresh [`LocalChain`] and an in-memory registry.
    pub fn in_memory(
        config: NetworkConfig,
        signers: Arc<SignerManager>,
    ) -> Result<(Self, Arc<LocalChain>), DeployError> {
        let chain = Arc::new(LocalChain::new(config.chain_id));
        let registry = Arc::new(MemoryRegistry::new(&config.name));
        let ctx = Self::new(config, registry, chain.clone(), chain.clone(), signers)?;
        Ok((ctx, chain))
    }

    /// Share a deferred-call log with other contexts of the same run.
    pub fn with_deferred(mut self, deferred: DeferredCalls) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn signers(&self) -> &Arc<SignerManager> {
        &self.signers
    }

    pub fn registry(&self) -> &Arc<dyn ContractRegistry> {
        &self.registry
    }

    pub fn deferred(&self) -> &DeferredCalls {
        &self.deferred
    }

    /// Calls deferred so far on this context's log
    pub async fn deferred_calls(&self) -> Vec<PendingCall> {
        self.deferred.list().await
    }

    // ── Accounts ───────────────────────────────────────────────────

    pub fn named_account(&self, name: &str) -> Result<Address, DeployError> {
        self.accounts.get(name).ok_or_else(|| DeployError::MissingNamedAccount {
            name: name.to_string(),
            network: self.config.name.clone(),
        })
    }

    pub fn unnamed_accounts(&self) -> &[Address] {
        self.accounts.unnamed()
    }

    pub async fn is_controlled(&self, account: &Address) -> bool {
        self.signers.has_signer(account).await
    }

    // ── Registry ───────────────────────────────────────────────────

    pub async fn get(&self, name: &str) -> Result<DeploymentRecord, DeployError> {
        self.registry.get(name).await
    }

    pub async fn get_or_null(&self, name: &str) -> Result<Option<DeploymentRecord>, DeployError> {
        self.registry.get_or_null(name).await
    }

    /// Deploy `name` unless an equivalent deployment is already recorded.
    pub async fn deploy(&self, name: &str, options: DeployOptions) -> Result<DeployResult, DeployError> {
        let contract = options.contract.clone().unwrap_or_else(|| name.to_string());

        if let Some(record) = self.registry.get_or_null(name).await? {
            if options.skip_if_already_deployed || record.matches(&contract, &options.args) {
                debug!(network = %self.name(), name, address = %record.address, "Reusing deployment");
                if options.log {
                    output::print_reused(name, &record.address);
                }
                return Ok(DeployResult { record, newly_deployed: false, receipt: None });
            }
            info!(network = %self.name(), name, previous = %record.address, "Deployment changed, redeploying");
        }

        if !self.signers.has_signer(&options.from).await {
            return Err(SignerError::NoSignerForAddress(options.from).into());
        }

        let request =
            TransactionRequest::create(self.chain_id(), options.from, &contract, options.args.clone());
        let tx = self.signers.sign_transaction(request).await?;
        let receipt = self.writer.send(tx).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| ChainError::reverted(None, &contract, "creation produced no contract"))?;

        let record = DeploymentRecord {
            name: name.to_string(),
            address,
            contract,
            args: options.args,
            transaction_hash: Some(receipt.transaction_hash),
            deployer: Some(options.from),
        };
        self.registry.save(record.clone()).await?;

        info!(network = %self.name(), name, %address, deployer = %options.from, "Deployed");
        if options.log {
            output::print_deployed(name, &address, Some(&receipt.transaction_hash));
        }
        Ok(DeployResult { record, newly_deployed: true, receipt: Some(receipt) })
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Read `field` from the deployment named `name`.
    pub async fn read(&self, name: &str, field: &str) -> Result<ContractValue, DeployError> {
        self.read_with(name, field, &[]).await
    }

    /// Read a view function taking arguments.
    pub async fn read_with(
        &self,
        name: &str,
        field: &str,
        args: &[ContractValue],
    ) -> Result<ContractValue, DeployError> {
        let record = self.get(name).await?;
        Ok(self.reader.read(record.address, field, args).await?)
    }

    /// Read an address-typed field.
    pub async fn read_address(&self, name: &str, field: &str) -> Result<Address, DeployError> {
        let value = self.read(name, field).await?;
        value.as_address().ok_or_else(|| DeployError::UnexpectedValue {
            contract: name.to_string(),
            field: field.to_string(),
            expected: "address",
            got: value.to_string(),
        })
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Call `method` on the deployment named `name`.
    ///
    /// Fails with [`DeployError::UnknownSigner`] when `options.from` is not a
    /// controlled account; nothing is sent in that case.
    pub async fn execute(
        &self,
        name: &str,
        options: TxOptions,
        method: &str,
        args: Vec<ContractValue>,
    ) -> Result<Receipt, DeployError> {
        let record = self.get(name).await?;

        if !self.signers.has_signer(&options.from).await {
            return Err(DeployError::UnknownSigner(Box::new(PendingCall::new(
                self.name(),
                self.chain_id(),
                name,
                record.address,
                options.from,
                method,
                args,
            ))));
        }

        let request = TransactionRequest::call(self.chain_id(), options.from, record.address, method, args);
        let tx = self.signers.sign_transaction(request).await?;
        let receipt = self.writer.send(tx).await?;

        info!(
            network = %self.name(),
            contract = name,
            method,
            from = %options.from,
            tx = %receipt.transaction_hash,
            "Executed"
        );
        if options.log {
            output::print_executed(name, method, &options.from, &receipt.transaction_hash);
        }
        Ok(receipt)
    }

    /// [`execute`](Self::execute), deferring the call when the sender is not controlled.
    pub async fn execute_or_defer(
        &self,
        name: &str,
        options: TxOptions,
        method: &str,
        args: Vec<ContractValue>,
    ) -> Result<WriteOutcome, DeployError> {
        let result = self.execute(name, options, method, args).await;
        self.catch_unknown_signer(result).await
    }

    /// Turn an unknown-signer failure into a deferred call; other errors pass through.
    pub async fn catch_unknown_signer(
        &self,
        result: Result<Receipt, DeployError>,
    ) -> Result<WriteOutcome, DeployError> {
        match result {
            Ok(receipt) => Ok(WriteOutcome::Executed(receipt)),
            Err(DeployError::UnknownSigner(call)) => {
                let call = *call;
                warn!(
                    network = %call.network,
                    contract = %call.contract,
                    signature = %call.signature,
                    from = %call.from,
                    "Signer not available, call deferred"
                );
                output::print_deferred(&call);
                self.deferred.push(call.clone()).await;
                Ok(WriteOutcome::Deferred(call))
            }
            Err(err) => Err(err),
        }
    }
}
