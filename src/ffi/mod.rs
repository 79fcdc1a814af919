//! FFI Module for the native verkle library
//!
//! Locates the platform-specific shared library, loads it on first use and
//! exposes its entry points to [`crate::PedersenHasher`].
//!
//! # Architecture
//!
//! ```text
//! PedersenHasher::new()
//!       │
//!       ▼
//! NativeBinding::library()   (loads at most once)
//!       │
//!       ▼
//! LibraryResolver            runtimes/<os>-<arch>/native/<file>
//!       │
//!       ▼
//! LibraryLoader (libloading)
//!       │
//!       ▼
//! context_new / pedersen_hash / context_free
//! ```
//!
//! # Deployment Layout
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux    | `runtimes/linux-<arch>/native/lib<name>.so` |
//! | macOS    | `runtimes/osx-<arch>/native/lib<name>.dylib` |
//! | Windows  | `runtimes/win-<arch>/native/<name>.dll` |
//!
//! # Example
//!
//! ```ignore
//! let binding = NativeBinding::new("c_verkle", "/opt/app");
//! let library = binding.library()?;
//! ```

mod error;
mod loader;
mod platform;
mod resolver;
mod types;

pub use error::{BindingError, BindingResult};
pub use loader::{DylibLoader, LibraryLoader, NativeBinding, NativeLibrary};
pub use platform::{FixedProbe, HostProbe, Os, PlatformDescriptor, PlatformProbe};
pub use resolver::{library_path_for, LibraryResolver, NATIVE_DIR, RUNTIMES_DIR};
pub use types::{
    Context, ContextFreeFn, ContextNewFn, NativeApi, PedersenHashFn, ADDRESS_LEN, DIGEST_LEN,
    TREE_INDEX_LEN,
};

#[cfg(test)]
pub(crate) mod stub;
