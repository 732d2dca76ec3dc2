use alloy_primitives::Address;
use std::sync::Arc;

use crate::abi::ContractValue;
use crate::chain::Receipt;
use crate::errors::DeployError;
use crate::network::{NetworkContext, TxOptions};

/// A deployed contract bound to the account that sends its transactions.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    ctx: Arc<NetworkContext>,
    name: String,
    address: Address,
    signer: Address,
}

impl ContractHandle {
    /// Handle on the deployment named `name`, sending as `signer`.
    pub async fn at(ctx: Arc<NetworkContext>, name: &str, signer: Address) -> Result<Self, DeployError> {
        let address = ctx.get(name).await?.address;
        Ok(Self { ctx, name: name.to_string(), address, signer })
    }

    /// Same contract, different sender
    pub fn connect(&self, signer: Address) -> Self {
        Self { signer, ..self.clone() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub async fn read(&self, field: &str) -> Result<ContractValue, DeployError> {
        self.ctx.read(&self.name, field).await
    }

    pub async fn read_with(&self, field: &str, args: &[ContractValue]) -> Result<ContractValue, DeployError> {
        self.ctx.read_with(&self.name, field, args).await
    }

    pub async fn read_address(&self, field: &str) -> Result<Address, DeployError> {
        self.ctx.read_address(&self.name, field).await
    }

    /// Send `method` from the bound signer.
    pub async fn execute(&self, method: &str, args: Vec<ContractValue>) -> Result<Receipt, DeployError> {
        self.ctx.execute(&self.name, TxOptions::new(self.signer), method, args).await
    }
}
