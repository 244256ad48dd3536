//! Runtime discovery
//!
//! Finds the shared libraries the host loads: the native-image library built
//! from the managed code, and `libjvm` inside a Java home or a GraalVM
//! distribution unpacked next to the project (`gradle/jdk/graalvm-*`).

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::util::config::{IsolateConfig, JvmConfig};

/// Base name of the native-image library produced by the managed build
pub const NATIVE_IMAGE_LIBRARY: &str = "kotlin-lib";

/// Discovery errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("Unsupported OS: {0}")]
    UnsupportedOs(String),
    #[error("Unsupported architecture: {0}")]
    UnsupportedArch(String),
    #[error("no libjvm found under {}", home.display())]
    NoLibjvm { home: PathBuf },
    #[error("no Java home configured and no GraalVM found in {}", searched.display())]
    NoJavaHome { searched: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Aarch64,
    X64,
}

/// Host platform in GraalVM download naming (`linux-x64`, `macos-aarch64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Platform this binary runs on
    pub fn current() -> Result<Self, LocateError> {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Classify free-form OS and architecture names
    pub fn from_names(
        os: &str,
        arch: &str,
    ) -> Result<Self, LocateError> {
        let os_lower = os.to_lowercase();
        let arch_lower = arch.to_lowercase();

        let os = if os_lower.contains("mac") || os_lower.contains("darwin") {
            Os::MacOs
        } else if os_lower.contains("win") {
            Os::Windows
        } else if os_lower.contains("linux") {
            Os::Linux
        } else {
            return Err(LocateError::UnsupportedOs(os.to_string()));
        };

        let arch = if arch_lower.contains("aarch64") || arch_lower.contains("arm64") {
            Arch::Aarch64
        } else if arch_lower.contains("x86_64") || arch_lower.contains("amd64") {
            Arch::X64
        } else {
            return Err(LocateError::UnsupportedArch(arch.to_string()));
        };

        Ok(Self { os, arch })
    }

    /// Platform library file name for `name` (`libname.so`, `name.dll`, ...)
    pub fn library_file_name(
        &self,
        name: &str,
    ) -> String {
        match self.os {
            Os::MacOs => format!("lib{}.dylib", name),
            Os::Linux => format!("lib{}.so", name),
            Os::Windows => format!("{}.dll", name),
        }
    }

    fn jre_arch_dir(&self) -> &'static str {
        match self.arch {
            Arch::Aarch64 => "aarch64",
            Arch::X64 => "amd64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let os = match self.os {
            Os::MacOs => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
        };
        let arch = match self.arch {
            Arch::Aarch64 => "aarch64",
            Arch::X64 => "x64",
        };
        write!(f, "{}-{}", os, arch)
    }
}

/// Find a GraalVM distribution directly under `dir`.
///
/// Picks the first directory, by name, containing both `graalvm` and
/// `version`. On macOS the `Contents/Home` bundle subdirectory is preferred
/// when present.
pub fn find_graalvm_home(
    dir: &Path,
    version: &str,
    platform: &Platform,
) -> Option<PathBuf> {
    let found = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .find(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.contains("graalvm") && name.contains(version)
        })?
        .into_path();

    if platform.os == Os::MacOs {
        let bundle_home = found.join("Contents").join("Home");
        if bundle_home.is_dir() {
            return Some(bundle_home);
        }
    }
    Some(found)
}

/// Places `libjvm` lives in across JDK layouts, most likely first
pub fn libjvm_candidates(
    java_home: &Path,
    platform: &Platform,
) -> Vec<PathBuf> {
    let file = platform.library_file_name("jvm");
    let dirs: Vec<PathBuf> = match platform.os {
        Os::Windows => vec![
            PathBuf::from("bin").join("server"),
            PathBuf::from("jre").join("bin").join("server"),
        ],
        Os::MacOs | Os::Linux => vec![
            PathBuf::from("lib").join("server"),
            PathBuf::from("jre").join("lib").join("server"),
            PathBuf::from("lib").join(platform.jre_arch_dir()).join("server"),
            PathBuf::from("jre")
                .join("lib")
                .join(platform.jre_arch_dir())
                .join("server"),
        ],
    };
    dirs.into_iter()
        .map(|dir| java_home.join(dir).join(&file))
        .collect()
}

/// First existing `libjvm` under `java_home`
pub fn find_libjvm(
    java_home: &Path,
    platform: &Platform,
) -> Result<PathBuf, LocateError> {
    libjvm_candidates(java_home, platform)
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LocateError::NoLibjvm {
            home: java_home.to_path_buf(),
        })
}

/// Resolve `libjvm` from configuration.
///
/// Order: explicit library, Java home, GraalVM under `graalvm_dir`. Relative
/// paths are taken from `cwd`.
pub fn resolve_libjvm(
    config: &JvmConfig,
    cwd: &Path,
    platform: &Platform,
) -> Result<PathBuf, LocateError> {
    if let Some(library) = &config.library {
        return Ok(cwd.join(library));
    }

    if let Some(home) = &config.java_home {
        return find_libjvm(&cwd.join(home), platform);
    }

    let search_dir = cwd.join(&config.graalvm_dir);
    match find_graalvm_home(&search_dir, &config.graalvm_version, platform) {
        Some(home) => {
            debug!("using GraalVM at {}", home.display());
            find_libjvm(&home, platform)
        }
        None => Err(LocateError::NoJavaHome {
            searched: search_dir,
        }),
    }
}

/// Path of the native-image library: configured, or `<cwd>/libkotlin-lib.so`
pub fn native_image_library(
    config: &IsolateConfig,
    cwd: &Path,
    platform: &Platform,
) -> PathBuf {
    match &config.library {
        Some(library) => cwd.join(library),
        None => cwd.join(platform.library_file_name(NATIVE_IMAGE_LIBRARY)),
    }
}

/// Everything discovery resolves, for the `locate` command
#[derive(Debug, Clone)]
pub struct LocateReport {
    pub platform: Platform,
    pub native_image: PathBuf,
    pub libjvm: Result<PathBuf, LocateError>,
}

impl LocateReport {
    pub fn new(
        isolate: &IsolateConfig,
        jvm: &JvmConfig,
        cwd: &Path,
        platform: Platform,
    ) -> Self {
        Self {
            platform,
            native_image: native_image_library(isolate, cwd, &platform),
            libjvm: resolve_libjvm(jvm, cwd, &platform),
        }
    }
}

impl fmt::Display for LocateReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "platform:     {}", self.platform)?;
        writeln!(f, "native image: {}", self.native_image.display())?;
        match &self.libjvm {
            Ok(path) => write!(f, "libjvm:       {}", path.display()),
            Err(err) => write!(f, "libjvm:       <{}>", err),
        }
    }
}
