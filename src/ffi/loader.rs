//! Dynamic Library Loader
//!
//! Loads the native verkle library on first use and keeps it mapped for as
//! long as any client references it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use libloading::Library;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::config::BindingConfig;

use super::error::{BindingError, BindingResult};
use super::resolver::LibraryResolver;
use super::types::{
    ContextFreeFn, ContextNewFn, NativeApi, PedersenHashFn, CONTEXT_FREE_SYMBOL,
    CONTEXT_NEW_SYMBOL, PEDERSEN_HASH_SYMBOL,
};

/// A loaded native library and its resolved entry points
pub struct NativeLibrary {
    /// Path the library was opened from, if it came from disk
    path: Option<PathBuf>,
    /// Entry points; valid while `_library` is alive
    api: NativeApi,
    /// Keeps the shared object mapped
    _library: Option<Library>,
}

impl NativeLibrary {
    /// Open a shared library and look up all required symbols
    pub fn open(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading runs the library's initializers. We trust the
        // artifact shipped in the deployment's runtimes/ tree.
        let library = unsafe {
            Library::new(&path).map_err(|e| BindingError::LibraryLoad {
                path: path.clone(),
                reason: e.to_string(),
            })?
        };

        // Safety: the symbol types match the exported C signatures.
        let api = unsafe {
            NativeApi {
                context_new: lookup::<ContextNewFn>(&library, &path, CONTEXT_NEW_SYMBOL)?,
                context_free: lookup::<ContextFreeFn>(&library, &path, CONTEXT_FREE_SYMBOL)?,
                pedersen_hash: lookup::<PedersenHashFn>(&library, &path, PEDERSEN_HASH_SYMBOL)?,
            }
        };

        Ok(Self {
            path: Some(path),
            api,
            _library: Some(library),
        })
    }

    /// Wrap entry points that live in the current process
    pub fn from_api(api: NativeApi) -> Self {
        Self {
            path: None,
            api,
            _library: None,
        }
    }

    /// Path to this library, if loaded from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolved entry points
    pub fn api(&self) -> &NativeApi {
        &self.api
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .finish()
    }
}

unsafe fn lookup<T: Copy>(library: &Library, path: &Path, name: &str) -> BindingResult<T> {
    let mut symbol_name = Vec::with_capacity(name.len() + 1);
    symbol_name.extend_from_slice(name.as_bytes());
    symbol_name.push(0);

    library
        .get::<T>(&symbol_name)
        .map(|symbol| *symbol)
        .map_err(|e| BindingError::SymbolNotFound {
            symbol: name.to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Strategy for turning a resolved path into a loaded library.
///
/// Injected into [`NativeBinding`] so tests can substitute a fake loader.
pub trait LibraryLoader: Send + Sync {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary>;
}

/// Loader backed by the platform dynamic linker
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibLoader;

impl LibraryLoader for DylibLoader {
    fn load(&self, path: &Path) -> BindingResult<NativeLibrary> {
        NativeLibrary::open(path)
    }
}

/// The FFI layer: a resolver plus a loader, loading at most once.
///
/// The first call to [`NativeBinding::library`] resolves the path and loads
/// the library; concurrent first callers wait for that single attempt and
/// all observe its outcome, the same library or a clone of the same error.
/// A failed attempt is not cached: a call that starts after it finished
/// tries the same path again.
pub struct NativeBinding {
    resolver: LibraryResolver,
    loader: Box<dyn LibraryLoader>,
    /// Deployment root the relative library path is joined onto
    root: PathBuf,
    library: OnceCell<Arc<NativeLibrary>>,
    /// Serializes load attempts and remembers how the last one failed
    attempt: Mutex<LoadAttempt>,
    /// Completed attempts; mirrors `LoadAttempt::generation` for lock-free reads
    generation: AtomicU64,
    loads: AtomicUsize,
}

#[derive(Default)]
struct LoadAttempt {
    generation: u64,
    last_error: Option<BindingError>,
}

impl NativeBinding {
    /// Binding for the host platform using the system dynamic linker
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self::with_loader(LibraryResolver::new(name), DylibLoader, root)
    }

    /// Binding with an injected resolver and loader
    pub fn with_loader(
        resolver: LibraryResolver,
        loader: impl LibraryLoader + 'static,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            loader: Box::new(loader),
            root: root.into(),
            library: OnceCell::new(),
            attempt: Mutex::new(LoadAttempt::default()),
            generation: AtomicU64::new(0),
            loads: AtomicUsize::new(0),
        }
    }

    /// The path resolver
    pub fn resolver(&self) -> &LibraryResolver {
        &self.resolver
    }

    /// Deployment root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the loaded library, loading it on first use
    pub fn library(&self) -> BindingResult<Arc<NativeLibrary>> {
        if let Some(library) = self.library.get() {
            return Ok(Arc::clone(library));
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let mut attempt = self.attempt.lock();

        if let Some(library) = self.library.get() {
            return Ok(Arc::clone(library));
        }
        // An attempt finished while we were queued: share its failure
        if attempt.generation != observed {
            if let Some(err) = &attempt.last_error {
                return Err(err.clone());
            }
        }

        let result = self.load_once();
        attempt.generation += 1;
        self.generation.store(attempt.generation, Ordering::SeqCst);

        match result {
            Ok(library) => {
                attempt.last_error = None;
                let _ = self.library.set(Arc::clone(&library));
                Ok(library)
            }
            Err(err) => {
                tracing::warn!(
                    library = %self.resolver.name(),
                    error = %err,
                    "native library load failed"
                );
                attempt.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn load_once(&self) -> BindingResult<Arc<NativeLibrary>> {
        let relative = self.resolver.resolve_library_path()?;
        let full_path = self.root.join(relative);
        self.loads.fetch_add(1, Ordering::SeqCst);

        let library = self.loader.load(&full_path)?;
        tracing::info!(
            library = %self.resolver.name(),
            path = %full_path.display(),
            "loaded native library"
        );
        Ok(Arc::new(library))
    }

    /// Whether the library has been loaded
    pub fn is_loaded(&self) -> bool {
        self.library.get().is_some()
    }

    /// How many load attempts reached the loader
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

static GLOBAL_BINDING: OnceCell<Arc<NativeBinding>> = OnceCell::new();

impl NativeBinding {
    /// Install the process-wide binding used by [`crate::PedersenHasher::new`].
    ///
    /// Must run before the first [`NativeBinding::global`] call; returns the
    /// rejected binding if one is already installed.
    pub fn install_global(binding: Arc<NativeBinding>) -> Result<(), Arc<NativeBinding>> {
        GLOBAL_BINDING.set(binding)
    }

    /// The process-wide binding.
    ///
    /// Built from `verkle.toml` (searched upward from the current directory)
    /// on first use unless one was installed beforehand. Without a configured
    /// root the library is looked up next to the running executable.
    pub fn global() -> Arc<NativeBinding> {
        let binding = GLOBAL_BINDING.get_or_init(|| {
            let config = BindingConfig::load_from_cwd().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid verkle.toml, using defaults");
                BindingConfig::default()
            });
            let root = config.deployment_root();
            tracing::debug!(root = %root.display(), "global binding root");
            Arc::new(NativeBinding::new(config.native.library.clone(), root))
        });
        Arc::clone(binding)
    }
}

impl std::fmt::Debug for NativeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBinding")
            .field("resolver", &self.resolver)
            .field("root", &self.root)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
