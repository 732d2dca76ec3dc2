//! Networks a Run Talks To
//!
//! A [`NetworkContext`] is the explicit replacement for an ambient deployment
//! environment: everything a step may touch on one network is reachable from
//! it, and nothing else is.
//!
//! ```text
//!   DeployEnv
//!     ├── network     → NetworkContext (registry, reader, writer, accounts, signers)
//!     └── companions  → { "l1": NetworkContext, ... }
//! ```

pub mod accounts;
pub mod config;
pub mod context;
pub mod env;

pub use accounts::{dev_accounts, AccountRef, NamedAccounts};
pub use config::{skip_unless_testnet, DeployConfig, NetworkConfig};
pub use context::{DeployOptions, DeployResult, NetworkContext, TxOptions};
pub use env::{DeployEnv, LocalEnv};
