use alloy_primitives::{Address, B256, U256};

/// Encode an address into a 32-byte ABI word (left-padded).
pub fn encode_address(addr: Address) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[12..32].copy_from_slice(addr.as_slice());
    B256::from(bytes)
}

/// Encode a uint256 into a 32-byte ABI word.
pub fn encode_u256(value: U256) -> B256 {
    B256::from(value.to_be_bytes())
}

/// Encode a bool into a 32-byte ABI word.
pub fn encode_bool(value: bool) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[31] = value as u8;
    B256::from(bytes)
}
