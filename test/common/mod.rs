//! Shared native stand-ins for integration tests
//!
//! The stub functions mimic the native library's C ABI. Counters are
//! thread-local so parallel tests in one binary stay independent.

#![allow(dead_code)]

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use verkle_bindings::ffi::{
    BindingError, BindingResult, Context, LibraryLoader, NativeApi, NativeLibrary, PlatformDescriptor,
    PlatformProbe, DIGEST_LEN,
};

/// Fixed digest written by the pattern stub
pub const STUB_DIGEST: [u8; DIGEST_LEN] = [
    0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA,
    0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC,
    0xBA, 0x98,
];

thread_local! {
    static CREATED: Cell<usize> = Cell::new(0);
    static FREED: Cell<usize> = Cell::new(0);
}

pub fn created() -> usize {
    CREATED.with(Cell::get)
}

pub fn freed() -> usize {
    FREED.with(Cell::get)
}

unsafe extern "C" fn context_new() -> *mut Context {
    CREATED.with(|c| c.set(c.get() + 1));
    Box::into_raw(Box::new([0u8; 16])) as *mut Context
}

unsafe extern "C" fn context_new_null() -> *mut Context {
    std::ptr::null_mut()
}

unsafe extern "C" fn context_free(ctx: *mut Context) {
    FREED.with(|c| c.set(c.get() + 1));
    drop(Box::from_raw(ctx as *mut [u8; 16]));
}

unsafe extern "C" fn pattern_hash(
    _ctx: *mut Context,
    _address: *const u8,
    _tree_index_le: *const u8,
    out: *mut u8,
) {
    std::ptr::copy_nonoverlapping(STUB_DIGEST.as_ptr(), out, DIGEST_LEN);
}

/// Digest depends on every input byte: `out[i] = address[i] + 3 * index[i]`
unsafe extern "C" fn mixing_hash(
    _ctx: *mut Context,
    address: *const u8,
    tree_index_le: *const u8,
    out: *mut u8,
) {
    for i in 0..DIGEST_LEN {
        let a = *address.add(i);
        let t = *tree_index_le.add(i);
        *out.add(i) = a.wrapping_add(t.wrapping_mul(3));
    }
}

pub fn mixing_digest(address: &[u8; 32], index: &[u8; 32]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    for i in 0..DIGEST_LEN {
        out[i] = address[i].wrapping_add(index[i].wrapping_mul(3));
    }
    out
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

/// Loader that counts calls and serves a fixed symbol table
pub struct CountingLoader {
    api: NativeApi,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
    pub paths: Arc<parking_lot::Mutex<Vec<PathBuf>>>,
}

impl CountingLoader {
    pub fn new(api: NativeApi) -> Self {
        Self {
            api,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            paths: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    /// Hold the load open for a while so racing callers pile up
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl LibraryLoader for CountingLoader {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_path_buf());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(NativeLibrary::from_api(self.api))
    }
}

/// Loader that always fails like a missing artifact, after a delay
pub struct FailingLoader {
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl FailingLoader {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl LibraryLoader for FailingLoader {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Err(BindingError::LibraryLoad {
            path: path.to_path_buf(),
            reason: "cannot open shared object file: No such file or directory".to_string(),
        })
    }
}

/// Probe that reports a fixed platform and counts how often it is asked
pub struct CountingProbe {
    os: &'static str,
    arch: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl CountingProbe {
    pub fn new(os: &'static str, arch: &'static str) -> Self {
        Self {
            os,
            arch,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PlatformProbe for CountingProbe {
    fn probe(&self) -> BindingResult<PlatformDescriptor> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PlatformDescriptor::from_names(self.os, self.arch)
    }
}
