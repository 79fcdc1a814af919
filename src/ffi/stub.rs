//! In-process stand-in for the native library, for unit tests.
//!
//! Call counters are thread-local so tests running in parallel do not see
//! each other's calls.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{BindingError, BindingResult, Context, LibraryLoader, NativeApi, NativeLibrary, DIGEST_LEN};

/// Digest written by [`pattern_hash`]
pub const STUB_DIGEST: [u8; DIGEST_LEN] = {
    let mut out = [0u8; DIGEST_LEN];
    let mut i = 0;
    while i < DIGEST_LEN {
        out[i] = 0xA0 ^ (i as u8);
        i += 1;
    }
    out
};

thread_local! {
    static CREATED: Cell<usize> = Cell::new(0);
    static FREED: Cell<usize> = Cell::new(0);
    static HASHED: Cell<usize> = Cell::new(0);
}

pub fn created() -> usize {
    CREATED.with(Cell::get)
}

pub fn freed() -> usize {
    FREED.with(Cell::get)
}

pub fn hashed() -> usize {
    HASHED.with(Cell::get)
}

unsafe extern "C" fn context_new() -> *mut Context {
    CREATED.with(|c| c.set(c.get() + 1));
    Box::into_raw(Box::new(0u64)) as *mut Context
}

unsafe extern "C" fn context_new_null() -> *mut Context {
    std::ptr::null_mut()
}

unsafe extern "C" fn context_free(ctx: *mut Context) {
    FREED.with(|c| c.set(c.get() + 1));
    if !ctx.is_null() {
        drop(Box::from_raw(ctx as *mut u64));
    }
}

unsafe extern "C" fn pattern_hash(
    _ctx: *mut Context,
    _address: *const u8,
    _tree_index_le: *const u8,
    out: *mut u8,
) {
    HASHED.with(|c| c.set(c.get() + 1));
    std::ptr::copy_nonoverlapping(STUB_DIGEST.as_ptr(), out, DIGEST_LEN);
}

/// `out[i] = address[i] ^ tree_index[i]`, so tests can see the inputs arrived
unsafe extern "C" fn mixing_hash(
    _ctx: *mut Context,
    address: *const u8,
    tree_index_le: *const u8,
    out: *mut u8,
) {
    HASHED.with(|c| c.set(c.get() + 1));
    for i in 0..DIGEST_LEN {
        *out.add(i) = *address.add(i) ^ *tree_index_le.add(i);
    }
}

pub fn pattern_api() -> NativeApi {
    NativeApi::new(context_new, context_free, pattern_hash)
}

pub fn mixing_api() -> NativeApi {
    NativeApi::new(context_new, context_free, mixing_hash)
}

pub fn failing_api() -> NativeApi {
    NativeApi::new(context_new_null, context_free, pattern_hash)
}

/// Loader that hands out a fixed symbol table and records what it was asked for
pub struct StubLoader {
    api: NativeApi,
    calls: Arc<AtomicUsize>,
    last_path: Arc<parking_lot::Mutex<Option<PathBuf>>>,
}

impl StubLoader {
    pub fn new(api: NativeApi) -> Self {
        Self {
            api,
            calls: Arc::new(AtomicUsize::new(0)),
            last_path: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn last_path(&self) -> Arc<parking_lot::Mutex<Option<PathBuf>>> {
        Arc::clone(&self.last_path)
    }
}

impl LibraryLoader for StubLoader {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock() = Some(path.to_path_buf());
        Ok(NativeLibrary::from_api(self.api))
    }
}

/// Loader whose every attempt fails as a missing artifact would
pub struct FailingLoader {
    calls: Arc<AtomicUsize>,
}

impl FailingLoader {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl LibraryLoader for FailingLoader {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BindingError::LibraryLoad {
            path: path.to_path_buf(),
            reason: "cannot open shared object file: No such file or directory".to_string(),
        })
    }
}
