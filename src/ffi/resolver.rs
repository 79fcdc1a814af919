//! Native Library Path Resolution
//!
//! Computes `runtimes/<os>-<arch>/native/<file>` for a logical library name
//! once and memoizes it for the lifetime of the resolver.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;

use super::error::{BindingError, BindingResult};
use super::platform::{HostProbe, PlatformDescriptor, PlatformProbe};

/// Top-level directory holding per-platform native artifacts
pub const RUNTIMES_DIR: &str = "runtimes";

/// Subdirectory of each `<os>-<arch>` tree holding the shared library
pub const NATIVE_DIR: &str = "native";

/// Build the relative artifact path for a platform
pub fn library_path_for(platform: &PlatformDescriptor, name: &str) -> PathBuf {
    PathBuf::from(RUNTIMES_DIR)
        .join(platform.runtime_id())
        .join(NATIVE_DIR)
        .join(platform.os.library_filename(name))
}

/// Resolves one logical library name to its relative on-disk path
pub struct LibraryResolver {
    /// Logical name, without `lib` prefix or extension
    name: String,
    probe: Box<dyn PlatformProbe>,
    /// Memoized result; left empty when resolution fails
    path: OnceCell<PathBuf>,
    /// Number of times the platform probe actually ran
    probes: AtomicUsize,
}

impl LibraryResolver {
    /// Resolver for the host platform
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_probe(name, HostProbe)
    }

    /// Resolver with a substituted platform probe
    pub fn with_probe(name: impl Into<String>, probe: impl PlatformProbe + 'static) -> Self {
        Self {
            name: name.into(),
            probe: Box::new(probe),
            path: OnceCell::new(),
            probes: AtomicUsize::new(0),
        }
    }

    /// Logical library name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the relative library path.
    ///
    /// The probe runs at most once per successful resolution; concurrent
    /// first callers block until the winner has stored the path.
    pub fn resolve_library_path(&self) -> BindingResult<&Path> {
        let path = self.path.get_or_try_init(|| {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let platform = self.probe.probe()?;
            let path = library_path_for(&platform, &self.name);
            tracing::debug!(
                library = %self.name,
                platform = %platform,
                path = %path.display(),
                "resolved native library path"
            );
            Ok::<_, BindingError>(path)
        })?;
        Ok(path.as_path())
    }

    /// Memoized path, if resolution has already succeeded
    pub fn cached_path(&self) -> Option<&Path> {
        self.path.get().map(PathBuf::as_path)
    }

    /// How many times the platform probe has run
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for LibraryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryResolver")
            .field("name", &self.name)
            .field("path", &self.path.get())
            .finish()
    }
}
