//! Context-scoped Pedersen hash client
//!
//! [`PedersenHasher`] owns exactly one native context. The context is
//! created with the hasher and freed exactly once, by [`PedersenHasher::release`]
//! or when the hasher is dropped.
//!
//! # Thread Safety
//!
//! The native context carries no locking of its own. `PedersenHasher` is
//! `Send` but not `Sync`, so sharing one context between threads requires
//! external serialization; [`SharedHasher`] provides that with a mutex.

use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ffi::{
    BindingError, BindingResult, Context, NativeBinding, NativeLibrary, ADDRESS_LEN, DIGEST_LEN,
    TREE_INDEX_LEN,
};
use crate::keys;

/// Client holding one native verkle context
///
/// A hasher may move to another thread but is never shared between threads;
/// wrap it in a [`SharedHasher`] for that.
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<verkle_bindings::PedersenHasher>();
/// ```
pub struct PedersenHasher {
    /// `None` once released
    context: Option<NonNull<Context>>,
    /// Keeps the entry points mapped while the context is alive
    library: Arc<NativeLibrary>,
}

// Safety: the context is exclusively owned and only touched through
// `&self`/`&mut self`; moving it to another thread is fine, sharing is not.
unsafe impl Send for PedersenHasher {}

impl PedersenHasher {
    /// Create a hasher on the process-wide binding
    pub fn new() -> BindingResult<Self> {
        Self::with_binding(&NativeBinding::global())
    }

    /// Create a hasher on an explicit binding, loading the library if needed
    pub fn with_binding(binding: &NativeBinding) -> BindingResult<Self> {
        let library = binding.library()?;
        Self::with_library(library)
    }

    /// Create a hasher on an already loaded library
    pub fn with_library(library: Arc<NativeLibrary>) -> BindingResult<Self> {
        // Safety: context_new takes no arguments and returns an owned pointer or null.
        let raw = unsafe { (library.api().context_new)() };
        let context = NonNull::new(raw).ok_or(BindingError::ContextCreation)?;
        tracing::debug!("created native context");

        Ok(Self {
            context: Some(context),
            library,
        })
    }

    /// Compute the Pedersen hash of `address || tree_index_le` into `out`.
    ///
    /// The borrows keep all three buffers in place for the duration of the
    /// native call. The native function reports no errors; its behavior on
    /// internal failure is undefined at this layer. After [`release`] the
    /// native side is not called and [`BindingError::Released`] is returned.
    ///
    /// [`release`]: PedersenHasher::release
    pub fn hash(
        &self,
        address: &[u8; ADDRESS_LEN],
        tree_index_le: &[u8; TREE_INDEX_LEN],
        out: &mut [u8; DIGEST_LEN],
    ) -> BindingResult<()> {
        let context = self.context.ok_or(BindingError::Released)?;

        // Safety: the context is live, the buffers have the lengths the
        // native function reads and writes, and `out` is uniquely borrowed.
        unsafe {
            (self.library.api().pedersen_hash)(
                context.as_ptr(),
                address.as_ptr(),
                tree_index_le.as_ptr(),
                out.as_mut_ptr(),
            );
        }
        Ok(())
    }

    /// Like [`hash`](PedersenHasher::hash), returning a fresh digest
    pub fn hash_to_array(
        &self,
        address: &[u8; ADDRESS_LEN],
        tree_index_le: &[u8; TREE_INDEX_LEN],
    ) -> BindingResult<[u8; DIGEST_LEN]> {
        let mut out = [0u8; DIGEST_LEN];
        self.hash(address, tree_index_le, &mut out)?;
        Ok(out)
    }

    /// Tree key of a leaf: the stem hash with its last byte set to `sub_index`
    pub fn tree_key(
        &self,
        address: &[u8; ADDRESS_LEN],
        tree_index_le: &[u8; TREE_INDEX_LEN],
        sub_index: u8,
    ) -> BindingResult<[u8; DIGEST_LEN]> {
        let stem = self.hash_to_array(address, tree_index_le)?;
        Ok(keys::swap_last_byte(stem, sub_index))
    }

    /// Free the native context.
    ///
    /// Returns `true` if this call freed it; later calls are no-ops.
    pub fn release(&mut self) -> bool {
        match self.context.take() {
            Some(context) => {
                // Safety: taken out of `self.context`, so freed exactly once.
                unsafe { (self.library.api().context_free)(context.as_ptr()) };
                tracing::debug!("freed native context");
                true
            }
            None => false,
        }
    }

    /// Whether the native context has been freed
    pub fn is_released(&self) -> bool {
        self.context.is_none()
    }
}

impl Drop for PedersenHasher {
    fn drop(&mut self) {
        if self.release() {
            tracing::debug!("native context released on drop");
        }
    }
}

impl std::fmt::Debug for PedersenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PedersenHasher")
            .field("released", &self.is_released())
            .field("library", &self.library)
            .finish()
    }
}

/// A [`PedersenHasher`] whose calls are serialized by a mutex, for sharing
/// one native context across threads.
#[derive(Debug)]
pub struct SharedHasher {
    inner: Mutex<PedersenHasher>,
}

impl SharedHasher {
    pub fn new(hasher: PedersenHasher) -> Self {
        Self {
            inner: Mutex::new(hasher),
        }
    }

    pub fn hash(
        &self,
        address: &[u8; ADDRESS_LEN],
        tree_index_le: &[u8; TREE_INDEX_LEN],
        out: &mut [u8; DIGEST_LEN],
    ) -> BindingResult<()> {
        self.inner.lock().hash(address, tree_index_le, out)
    }

    pub fn hash_to_array(
        &self,
        address: &[u8; ADDRESS_LEN],
        tree_index_le: &[u8; TREE_INDEX_LEN],
    ) -> BindingResult<[u8; DIGEST_LEN]> {
        self.inner.lock().hash_to_array(address, tree_index_le)
    }

    pub fn release(&self) -> bool {
        self.inner.lock().release()
    }

    pub fn into_inner(self) -> PedersenHasher {
        self.inner.into_inner()
    }
}
