//! Ethereum address shape check.
//!
//! Only the shape is checked (`0x` prefix, 42 characters). Hex digits and
//! checksums are left to the node, which answers malformed input with a
//! JSON-RPC error.

pub const ADDRESS_LEN: usize = 42;

pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_LEN && address.starts_with("0x")
}
