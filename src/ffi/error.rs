//! Binding Errors
//!
//! Every failure the binding can surface. All of them are fatal for the
//! operation that triggered them; nothing here is retried internally.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for native binding operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The host OS is not one of linux, macos, windows
    #[error("Unsupported platform: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// The native artifact is missing, has the wrong ABI or is not readable
    #[error("Failed to load native library '{}': {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    /// The artifact loaded but does not export an expected symbol
    #[error("Symbol '{symbol}' not found in '{}': {reason}", path.display())]
    SymbolNotFound {
        symbol: String,
        path: PathBuf,
        reason: String,
    },

    /// `context_new` returned null
    #[error("Native context allocation failed")]
    ContextCreation,

    /// The client's native context has already been released
    #[error("Native context already released")]
    Released,
}

impl BindingError {
    /// True for errors raised while locating or opening the native artifact
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            BindingError::LibraryLoad { .. } | BindingError::SymbolNotFound { .. }
        )
    }
}

/// Result type for native binding operations.
pub type BindingResult<T> = Result<T, BindingError>;
