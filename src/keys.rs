//! Tree key encoding helpers
//!
//! Byte layouts the native Pedersen hash expects for its inputs.

use crate::ffi::{ADDRESS_LEN, DIGEST_LEN, TREE_INDEX_LEN};

/// Length of a legacy account address
pub const ADDRESS20_LEN: usize = 20;

/// Widen a 20-byte address to the 32-byte form by left-padding with zeros
pub fn address32_from_address20(address: &[u8; ADDRESS20_LEN]) -> [u8; ADDRESS_LEN] {
    let mut out = [0u8; ADDRESS_LEN];
    out[ADDRESS_LEN - ADDRESS20_LEN..].copy_from_slice(address);
    out
}

/// Accept either address width, widening 20-byte addresses.
///
/// Returns `None` for any other length.
pub fn address32_from_slice(bytes: &[u8]) -> Option<[u8; ADDRESS_LEN]> {
    match bytes.len() {
        ADDRESS20_LEN => {
            let mut address = [0u8; ADDRESS20_LEN];
            address.copy_from_slice(bytes);
            Some(address32_from_address20(&address))
        }
        ADDRESS_LEN => {
            let mut address = [0u8; ADDRESS_LEN];
            address.copy_from_slice(bytes);
            Some(address)
        }
        _ => None,
    }
}

/// Little-endian tree index, zero-extended to the full width
pub fn tree_index_le(index: u64) -> [u8; TREE_INDEX_LEN] {
    let mut out = [0u8; TREE_INDEX_LEN];
    out[..8].copy_from_slice(&index.to_le_bytes());
    out
}

/// Tree index from little-endian bytes no longer than the full width
pub fn tree_index_from_le_slice(bytes: &[u8]) -> Option<[u8; TREE_INDEX_LEN]> {
    if bytes.len() > TREE_INDEX_LEN {
        return None;
    }
    let mut out = [0u8; TREE_INDEX_LEN];
    out[..bytes.len()].copy_from_slice(bytes);
    Some(out)
}

/// Replace the last byte of a stem hash with the leaf sub-index
pub fn swap_last_byte(mut stem: [u8; DIGEST_LEN], sub_index: u8) -> [u8; DIGEST_LEN] {
    stem[DIGEST_LEN - 1] = sub_index;
    stem
}
