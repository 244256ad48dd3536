//! embed-host configuration system
//!
//! Supports user-level and project-level configuration files plus
//! environment and CLI overrides.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high -> low):
//! 1. CLI arguments
//! 2. Environment variables (EMBED_HOST_ISOLATE_LIB, EMBED_HOST_JVM_LIB)
//! 3. Project-level (./embed-host.toml)
//! 4. User-level (~/.config/embed-host/config.toml)
//! 5. Default values
//! ```
//!
//! The first file found is used as a whole; files are not merged with each
//! other. `JAVA_HOME` only fills `jvm.java_home` when no file sets it.
//!
//! # Usage
//!
//! ```rust,no_run
//! use embed_host::util::config::load_config;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let loaded = load_config(None, &cwd).unwrap();
//! println!("entry point: {}", loaded.config.isolate.entry_point);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runtime::jvm::JniVersion;
use crate::util::logger::LogLevel;

/// File name of the project-level configuration
pub const PROJECT_CONFIG_FILE: &str = "embed-host.toml";

/// Overrides the native-image library path
pub const ENV_ISOLATE_LIB: &str = "EMBED_HOST_ISOLATE_LIB";

/// Overrides the libjvm path
pub const ENV_JVM_LIB: &str = "EMBED_HOST_JVM_LIB";

/// Fallback Java home
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";

/// Complete host configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HostConfig {
    /// Native-image isolate settings
    #[serde(default)]
    pub isolate: IsolateConfig,
    /// JVM settings
    #[serde(default)]
    pub jvm: JvmConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Isolate configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IsolateConfig {
    /// Path to the native-image shared library
    #[serde(default)]
    pub library: Option<PathBuf>,
    /// Exported C entry point to invoke
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_entry_point() -> String {
    "noop".to_string()
}

impl Default for IsolateConfig {
    fn default() -> Self {
        Self {
            library: None,
            entry_point: default_entry_point(),
        }
    }
}

/// JVM configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JvmConfig {
    /// Explicit path to libjvm
    #[serde(default)]
    pub library: Option<PathBuf>,
    /// Java home used to locate libjvm
    #[serde(default)]
    pub java_home: Option<PathBuf>,
    /// Directory searched for a GraalVM distribution when no Java home is known
    #[serde(default = "default_graalvm_dir")]
    pub graalvm_dir: PathBuf,
    /// GraalVM major version to look for in `graalvm_dir`
    #[serde(default = "default_graalvm_version")]
    pub graalvm_version: String,
    /// Class path entries
    #[serde(default)]
    pub class_path: Vec<PathBuf>,
    /// Extra JVM option strings (e.g. `-Xmx256m`)
    #[serde(default)]
    pub options: Vec<String>,
    /// Class to instantiate
    #[serde(default = "default_class")]
    pub class: String,
    /// No-argument void method to call
    #[serde(default = "default_method")]
    pub method: String,
    /// Requested JNI version
    #[serde(default)]
    pub version: JniVersion,
    /// Pass `ignoreUnrecognized` to the JVM
    #[serde(default = "default_ignore_unrecognized")]
    pub ignore_unrecognized: bool,
}

fn default_graalvm_dir() -> PathBuf {
    PathBuf::from("gradle").join("jdk")
}

fn default_graalvm_version() -> String {
    "25".to_string()
}

fn default_class() -> String {
    "MyJavaClass".to_string()
}

fn default_method() -> String {
    "noop".to_string()
}

fn default_ignore_unrecognized() -> bool {
    true
}

impl Default for JvmConfig {
    fn default() -> Self {
        Self {
            library: None,
            java_home: None,
            graalvm_dir: default_graalvm_dir(),
            graalvm_version: default_graalvm_version(),
            class_path: Vec::new(),
            options: Vec::new(),
            class: default_class(),
            method: default_method(),
            version: JniVersion::default(),
            ignore_unrecognized: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogConfig {
    /// Level used when the CLI does not set one
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config FILE`
    Explicit(PathBuf),
    /// `./embed-host.toml`
    Project(PathBuf),
    /// `~/.config/embed-host/config.toml`
    User(PathBuf),
    /// Built-in defaults
    Default,
}

/// Loaded configuration and its source
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HostConfig,
    pub source: ConfigSource,
}

impl HostConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    /// Read and parse a configuration file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(
        &mut self,
        lookup: F,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(lib) = non_empty(ENV_ISOLATE_LIB) {
            self.isolate.library = Some(PathBuf::from(lib));
        }
        if let Some(lib) = non_empty(ENV_JVM_LIB) {
            self.jvm.library = Some(PathBuf::from(lib));
        }
        if self.jvm.java_home.is_none() {
            if let Some(home) = non_empty(ENV_JAVA_HOME) {
                self.jvm.java_home = Some(PathBuf::from(home));
            }
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("embed-host"));
    }

    // Fallback to ~/.config/embed-host
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("embed-host"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("embed-host"));
    }

    None
}

/// Get the user config file path (~/.config/embed-host/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load configuration following the file hierarchy.
///
/// An explicit path must exist. Otherwise the project file in `cwd` is tried,
/// then the user file, then defaults. Environment overrides are not applied
/// here.
pub fn load_config(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<LoadedConfig, ConfigError> {
    load_config_with_user(explicit, cwd, get_config_path().as_deref())
}

/// Same as [`load_config`] with the user config path supplied by the caller
pub fn load_config_with_user(
    explicit: Option<&Path>,
    cwd: &Path,
    user_path: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(LoadedConfig {
            config: HostConfig::load_from_path(path)?,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }

    let project = cwd.join(PROJECT_CONFIG_FILE);
    if project.is_file() {
        return Ok(LoadedConfig {
            config: HostConfig::load_from_path(&project)?,
            source: ConfigSource::Project(project),
        });
    }

    if let Some(user) = user_path.filter(|p| p.is_file()) {
        return Ok(LoadedConfig {
            config: HostConfig::load_from_path(user)?,
            source: ConfigSource::User(user.to_path_buf()),
        });
    }

    Ok(LoadedConfig {
        config: HostConfig::default(),
        source: ConfigSource::Default,
    })
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}
