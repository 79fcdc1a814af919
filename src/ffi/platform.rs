//! Platform Detection
//!
//! Maps the running process to the `<os>-<arch>` pair used by the
//! `runtimes/` deployment layout.

use std::fmt;

use super::error::{BindingError, BindingResult};

/// Operating systems a native artifact is shipped for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
}

impl Os {
    /// Map a `std::env::consts::OS` style name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::MacOs),
            "windows" => Some(Os::Windows),
            _ => None,
        }
    }

    /// Directory prefix under `runtimes/`
    pub fn runtime_prefix(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "osx",
            Os::Windows => "win",
        }
    }

    /// Platform-specific shared library file name for a logical name
    pub fn library_filename(&self, name: &str) -> String {
        match self {
            Os::Linux => format!("lib{}.so", name),
            Os::MacOs => format!("lib{}.dylib", name),
            Os::Windows => format!("{}.dll", name),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Linux => write!(f, "linux"),
            Os::MacOs => write!(f, "macos"),
            Os::Windows => write!(f, "windows"),
        }
    }
}

/// The supported platform the process runs on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformDescriptor {
    pub os: Os,
    /// Lowercase architecture name in runtime-identifier form (`x64`, `arm64`, ...)
    pub arch: String,
}

impl PlatformDescriptor {
    /// Build a descriptor from raw OS and architecture names.
    ///
    /// Fails with [`BindingError::UnsupportedPlatform`] when the OS is not
    /// linux, macos or windows.
    pub fn from_names(os: &str, arch: &str) -> BindingResult<Self> {
        let os_kind = Os::from_name(os).ok_or_else(|| BindingError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })?;
        Ok(Self {
            os: os_kind,
            arch: normalize_arch(arch),
        })
    }

    /// `<os>-<arch>` directory name, e.g. `linux-x64`
    pub fn runtime_id(&self) -> String {
        format!("{}-{}", self.os.runtime_prefix(), self.arch)
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Source of the current platform
pub trait PlatformProbe: Send + Sync {
    fn probe(&self) -> BindingResult<PlatformDescriptor>;
}

/// Probe backed by the compile-time target of this process
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl PlatformProbe for HostProbe {
    fn probe(&self) -> BindingResult<PlatformDescriptor> {
        PlatformDescriptor::from_names(std::env::consts::OS, host_arch())
    }
}

/// `std::env::consts::ARCH` does not distinguish endianness on powerpc64
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "powerpc64" if cfg!(target_endian = "little") => "powerpc64le",
        arch => arch,
    }
}

/// Probe returning a fixed platform, for cross-layout tooling and tests
#[derive(Debug, Clone)]
pub struct FixedProbe {
    os: String,
    arch: String,
}

impl FixedProbe {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

impl PlatformProbe for FixedProbe {
    fn probe(&self) -> BindingResult<PlatformDescriptor> {
        PlatformDescriptor::from_names(&self.os, &self.arch)
    }
}

/// Rust target arch names to runtime-identifier names.
///
/// Architectures without a mapping here (arm, riscv64, s390x, loongarch64)
/// already share their Rust name with the runtime identifier. Big-endian
/// powerpc64 has no runtime identifier and keeps the Rust name.
fn normalize_arch(arch: &str) -> String {
    match arch {
        "x86_64" | "amd64" => "x64".to_string(),
        "aarch64" => "arm64".to_string(),
        "x86" | "i386" | "i586" | "i686" => "x86".to_string(),
        "powerpc64le" | "ppc64le" => "ppc64le".to_string(),
        other => other.to_lowercase(),
    }
}
