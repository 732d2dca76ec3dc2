//! # tunnel-deploy - Land Tunnel Deployment Library
//!
//! Deploys the L1/L2 land tunnel pair and the game token test contracts, and
//! wires cross-chain endpoints idempotently: every step reads current state
//! first and only writes what differs, so any run can be repeated safely.

pub mod abi;
pub mod chain;
pub mod cli;
pub mod constants;
pub mod deploy;
pub mod errors;
pub mod fixtures;
pub mod network;
pub mod output;
pub mod registry;
pub mod signer;
pub mod wiring;
