use alloy_primitives::keccak256;

use super::ContractValue;

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Canonical signature of a method called with `args`, e.g. `setFxRootTunnel(address)`.
pub fn method_signature(method: &str, args: &[ContractValue]) -> String {
    let types: Vec<String> = args.iter().map(ContractValue::abi_type).collect();
    format!("{method}({})", types.join(","))
}
