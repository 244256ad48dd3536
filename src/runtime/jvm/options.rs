//! JVM creation options
//!
//! [`JvmOptions`] holds the option strings in Rust form; [`InitArgs`] owns the
//! C strings and the `JavaVMOption` array that `JNI_CreateJavaVM` reads, so
//! the pointers stay valid for the whole call.

use std::ffi::{c_void, CString};
use std::path::{Path, PathBuf};

use jni_sys::{JavaVMInitArgs, JavaVMOption, JNI_FALSE, JNI_TRUE};

use super::JniVersion;
use crate::util::config::JvmConfig;

/// Separator used in `java.class.path`
#[cfg(windows)]
pub const CLASS_PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const CLASS_PATH_SEPARATOR: &str = ":";

/// Options passed to `JNI_CreateJavaVM`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmOptions {
    pub version: JniVersion,
    pub class_path: Vec<PathBuf>,
    pub options: Vec<String>,
    pub ignore_unrecognized: bool,
}

impl Default for JvmOptions {
    fn default() -> Self {
        Self {
            version: JniVersion::default(),
            class_path: Vec::new(),
            options: Vec::new(),
            ignore_unrecognized: true,
        }
    }
}

/// An option string contained an interior NUL byte
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("JVM option contains a NUL byte: {0:?}")]
pub struct InvalidOption(pub String);

impl JvmOptions {
    pub fn new(version: JniVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn from_config(config: &JvmConfig) -> Self {
        Self {
            version: config.version,
            class_path: config.class_path.clone(),
            options: config.options.clone(),
            ignore_unrecognized: config.ignore_unrecognized,
        }
    }

    /// Append a raw option string such as `-Xmx256m`
    pub fn option(
        mut self,
        option: impl Into<String>,
    ) -> Self {
        self.options.push(option.into());
        self
    }

    /// Append a class path entry
    pub fn class_path_entry(
        mut self,
        entry: impl AsRef<Path>,
    ) -> Self {
        self.class_path.push(entry.as_ref().to_path_buf());
        self
    }

    /// The full option list handed to the JVM.
    ///
    /// The class path, when present, comes first as `-Djava.class.path=`.
    pub fn option_strings(&self) -> Vec<String> {
        let mut all = Vec::with_capacity(self.options.len() + 1);
        if !self.class_path.is_empty() {
            let joined = self
                .class_path
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(CLASS_PATH_SEPARATOR);
            all.push(format!("-Djava.class.path={}", joined));
        }
        all.extend(self.options.iter().cloned());
        all
    }

    /// Reject option strings the JVM could not receive
    pub fn validate(&self) -> Result<(), InvalidOption> {
        match self.option_strings().into_iter().find(|s| s.contains('\0')) {
            Some(bad) => Err(InvalidOption(bad)),
            None => Ok(()),
        }
    }

    /// Build the C-side argument block
    pub fn to_init_args(&self) -> Result<InitArgs, InvalidOption> {
        let strings = self
            .option_strings()
            .into_iter()
            .map(|s| CString::new(s.clone()).map_err(|_| InvalidOption(s)))
            .collect::<Result<Vec<_>, _>>()?;

        let options = strings
            .iter()
            .map(|s| JavaVMOption {
                optionString: s.as_ptr() as *mut _,
                extraInfo: std::ptr::null_mut::<c_void>(),
            })
            .collect();

        Ok(InitArgs {
            version: self.version,
            ignore_unrecognized: self.ignore_unrecognized,
            strings,
            options,
        })
    }
}

/// Owned backing storage for a `JavaVMInitArgs`
pub struct InitArgs {
    version: JniVersion,
    ignore_unrecognized: bool,
    strings: Vec<CString>,
    options: Vec<JavaVMOption>,
}

impl std::fmt::Debug for InitArgs {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("InitArgs")
            .field("version", &self.version)
            .field("ignore_unrecognized", &self.ignore_unrecognized)
            .field("options", &self.strings)
            .finish()
    }
}

impl InitArgs {
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Raw struct borrowing from `self`; must not outlive it.
    pub fn as_raw(&mut self) -> JavaVMInitArgs {
        JavaVMInitArgs {
            version: self.version.raw(),
            nOptions: self.options.len() as _,
            options: if self.options.is_empty() {
                std::ptr::null_mut()
            } else {
                self.options.as_mut_ptr()
            },
            ignoreUnrecognized: if self.ignore_unrecognized {
                JNI_TRUE
            } else {
                JNI_FALSE
            },
        }
    }
}
