//! Binding Configuration
//!
//! Handles parsing and management of verkle.toml configuration files.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = "verkle.toml";

/// Environment variable overriding `native.root`
pub const ROOT_ENV_VAR: &str = "VERKLE_NATIVE_ROOT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching verkle.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BindingConfig {
    /// Native library location
    #[serde(default)]
    pub native: NativeConfig,

    /// Directory the config was read from, if it came from a file
    #[serde(skip)]
    source_dir: Option<PathBuf>,
}

impl BindingConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let mut config: BindingConfig = toml::from_str(&std::fs::read_to_string(path)?)?;
        config.source_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()?;
        Self::find_and_load(&cwd)
    }

    /// Search upward from `start_dir` for verkle.toml.
    ///
    /// Defaults are returned when no file exists up to the filesystem root;
    /// [`BindingConfig::source_dir`] tells the two cases apart.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        match start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
        {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding the verkle.toml this config was loaded from
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// Deployment root the `runtimes/` tree is looked up in.
    ///
    /// `VERKLE_NATIVE_ROOT` wins; then `native.root`, taken relative to the
    /// config file's directory; otherwise the directory of the running
    /// executable.
    pub fn deployment_root(&self) -> PathBuf {
        self.root_with_override(std::env::var_os(ROOT_ENV_VAR))
    }

    fn root_with_override(&self, env_root: Option<OsString>) -> PathBuf {
        if let Some(root) = env_root.filter(|root| !root.is_empty()) {
            return PathBuf::from(root);
        }
        match (&self.native.root, &self.source_dir) {
            (Some(root), Some(dir)) if root.is_relative() => dir.join(root),
            (Some(root), _) => root.clone(),
            (None, _) => application_dir(),
        }
    }
}

/// Directory containing the running executable.
///
/// Falls back to the current directory when the executable path is unknown.
pub fn application_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            tracing::warn!(error = %e, "executable path unavailable, using current directory");
            PathBuf::from(".")
        }
    }
}

/// Native library settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeConfig {
    /// Logical library name, without `lib` prefix or extension
    #[serde(default = "default_library")]
    pub library: String,

    /// Directory the `runtimes/` tree lives in; unset means the executable's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

fn default_library() -> String {
    "c_verkle".to_string()
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            root: None,
        }
    }
}
