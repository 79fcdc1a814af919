//! Native Interface Types
//!
//! Signatures of the symbols exported by the native verkle library.

/// Opaque native verkle context (precomputed curve parameters).
///
/// Only ever handled behind a pointer.
#[repr(C)]
pub struct Context {
    _private: [u8; 0],
}

/// Length of the address buffer read by `pedersen_hash`
pub const ADDRESS_LEN: usize = 32;

/// Length of the little-endian tree index buffer read by `pedersen_hash`
pub const TREE_INDEX_LEN: usize = 32;

/// Length of the digest buffer written by `pedersen_hash`
pub const DIGEST_LEN: usize = 32;

/// Exported symbol names
pub const CONTEXT_NEW_SYMBOL: &str = "context_new";
pub const CONTEXT_FREE_SYMBOL: &str = "context_free";
pub const PEDERSEN_HASH_SYMBOL: &str = "pedersen_hash";

/// `Context* context_new(void)`
pub type ContextNewFn = unsafe extern "C" fn() -> *mut Context;

/// `void context_free(Context*)`
pub type ContextFreeFn = unsafe extern "C" fn(*mut Context);

/// `void pedersen_hash(Context*, const uint8_t* address, const uint8_t* tree_index_le, uint8_t* out)`
pub type PedersenHashFn =
    unsafe extern "C" fn(*mut Context, *const u8, *const u8, *mut u8);

/// Resolved entry points of the native library
#[derive(Debug, Clone, Copy)]
pub struct NativeApi {
    pub context_new: ContextNewFn,
    pub context_free: ContextFreeFn,
    pub pedersen_hash: PedersenHashFn,
}

impl NativeApi {
    /// Build a symbol table from function pointers.
    ///
    /// Used by loaders that do not go through a shared library, such as
    /// statically linked or in-process implementations.
    pub fn new(
        context_new: ContextNewFn,
        context_free: ContextFreeFn,
        pedersen_hash: PedersenHashFn,
    ) -> Self {
        Self {
            context_new,
            context_free,
            pedersen_hash,
        }
    }
}
