//! Contract values and ABI call encoding
//!
//! Every argument passed to a constructor or method, and every value read back
//! from a contract, is a [`ContractValue`]. Deployment files store constructor
//! arguments in this form, and captured calls carry the ABI calldata built here
//! so they can be replayed by any wallet or multisig UI.

pub mod helpers;
pub mod selectors;

pub use helpers::{encode_address, encode_bool, encode_u256};
pub use selectors::{function_selector, method_signature};

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value crossing the contract boundary.
///
/// Serialized with an explicit type tag, `{"type": "uint", "value": "0x90"}`.
/// Uints in `[2^156, 2^160)` print as the same hex text as an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ContractValue {
    /// 20-byte account or contract address
    Address(Address),
    /// Boolean flag
    Bool(bool),
    /// Unsigned 256-bit integer
    Uint(U256),
    /// Dynamic array
    List(Vec<ContractValue>),
}

impl ContractValue {
    /// Build a `uint256[]` from plain integers.
    pub fn uints(values: &[u64]) -> Self {
        Self::List(values.iter().map(|v| Self::Uint(U256::from(*v))).collect())
    }

    /// Solidity type name used in method signatures.
    ///
    /// Empty lists have no element to inspect and default to `uint256[]`.
    pub fn abi_type(&self) -> String {
        match self {
            Self::Address(_) => "address".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Uint(_) => "uint256".to_string(),
            Self::List(items) => {
                let inner = items
                    .first()
                    .map(Self::abi_type)
                    .unwrap_or_else(|| "uint256".to_string());
                format!("{inner}[]")
            }
        }
    }

    /// Whether the value is encoded in the tail section.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn encode_static(&self, out: &mut Vec<u8>) {
        match self {
            Self::Address(addr) => out.extend_from_slice(encode_address(*addr).as_slice()),
            Self::Bool(flag) => out.extend_from_slice(encode_bool(*flag).as_slice()),
            Self::Uint(v) => out.extend_from_slice(encode_u256(*v).as_slice()),
            Self::List(_) => unreachable!("lists are encoded in the tail"),
        }
    }

    fn encode_tail(&self, out: &mut Vec<u8>) {
        if let Self::List(items) = self {
            out.extend_from_slice(encode_u256(U256::from(items.len())).as_slice());
            out.extend(encode_args(items));
        }
    }
}

impl fmt::Display for ContractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<Address> for ContractValue {
    fn from(addr: Address) -> Self {
        Self::Address(addr)
    }
}

impl From<bool> for ContractValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<U256> for ContractValue {
    fn from(v: U256) -> Self {
        Self::Uint(v)
    }
}

impl From<u64> for ContractValue {
    fn from(v: u64) -> Self {
        Self::Uint(U256::from(v))
    }
}

/// ABI-encode a tuple of arguments (head/tail layout).
pub fn encode_args(args: &[ContractValue]) -> Vec<u8> {
    let head_len = 32 * args.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        if arg.is_dynamic() {
            let offset = U256::from(head_len + tail.len());
            head.extend_from_slice(encode_u256(offset).as_slice());
            arg.encode_tail(&mut tail);
        } else {
            arg.encode_static(&mut head);
        }
    }

    head.extend(tail);
    head
}

/// Calldata for `method(args...)`: 4-byte selector followed by the encoded arguments.
pub fn calldata(method: &str, args: &[ContractValue]) -> Bytes {
    let signature = method_signature(method, args);
    let mut data = function_selector(&signature).to_vec();
    data.extend(encode_args(args));
    data.into()
}
