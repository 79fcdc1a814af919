//! Verkle Bindings - runtime-resolved access to the native verkle library
//!
//! Exposes the native Pedersen hash used for verkle tree keys through a
//! small, lifetime-bound client.
//!
//! # Features
//!
//! - **Late binding**: the platform-specific shared library is located and
//!   loaded on first use, exactly once per binding
//! - **Owned native context**: each [`PedersenHasher`] owns one context and
//!   frees it exactly once, on release or drop
//! - **Substitutable loader**: resolution and loading are injected, so tests
//!   and embedders can supply their own
//!
//! # Example
//!
//! ```no_run
//! use verkle_bindings::{keys, PedersenHasher};
//!
//! let hasher = PedersenHasher::new()?;
//! let address = keys::address32_from_address20(&[0x11; 20]);
//! let digest = hasher.hash_to_array(&address, &keys::tree_index_le(0))?;
//! # Ok::<(), verkle_bindings::BindingError>(())
//! ```
//!
//! # Deployment
//!
//! ```text
//! <root>/runtimes/linux-x64/native/libc_verkle.so
//! <root>/runtimes/osx-arm64/native/libc_verkle.dylib
//! <root>/runtimes/win-x64/native/c_verkle.dll
//! ```

pub mod config;
pub mod ffi;
pub mod hasher;
pub mod keys;

pub use config::{BindingConfig, ConfigError};
pub use ffi::{BindingError, BindingResult, NativeBinding};
pub use hasher::{PedersenHasher, SharedHasher};
