//! Host runtimes
//!
//! This module contains the two managed runtimes the host can drive: a
//! GraalVM native-image isolate and a JVM created through JNI. Both are
//! reached through shared libraries opened at run time.

pub mod isolate;
pub mod jvm;

#[cfg(test)]
pub(crate) mod testing;

use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;

/// Errors opening a host library or resolving its symbols
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to load {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("{} does not export {symbol}: {source}", path.display())]
    Symbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

/// Open a shared library.
///
/// On unix the library is opened with `RTLD_NOW | RTLD_GLOBAL` so missing
/// symbols surface here rather than at the first call.
pub fn open_library(path: &Path) -> Result<Library, LibraryError> {
    #[cfg(unix)]
    let lib = unsafe {
        let flags = libloading::os::unix::RTLD_NOW | libloading::os::unix::RTLD_GLOBAL;
        libloading::os::unix::Library::open(Some(path), flags).map(Library::from)
    };
    #[cfg(not(unix))]
    let lib = unsafe { Library::new(path) };

    lib.map_err(|source| LibraryError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve `symbol` in `lib` as a function pointer of type `F`.
///
/// # Safety
///
/// `F` must be a function pointer type matching the exported symbol, and the
/// returned pointer must not be called after `lib` is dropped.
pub unsafe fn load_symbol<F: Copy>(
    lib: &Library,
    path: &Path,
    symbol: &str,
) -> Result<F, LibraryError> {
    lib.get::<F>(symbol.as_bytes())
        .map(|sym| *sym)
        .map_err(|source| LibraryError::Symbol {
            path: path.to_path_buf(),
            symbol: symbol.to_string(),
            source,
        })
}
