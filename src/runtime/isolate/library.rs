//! Native-image shared library loaded at run time

use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use libloading::Library;
use tracing::debug;

use super::IsolateRuntime;
use crate::runtime::{load_symbol, open_library, LibraryError};

/// `graal_isolate_t`
#[repr(C)]
pub struct GraalIsolate {
    _private: [u8; 0],
}

/// `graal_isolatethread_t`
#[repr(C)]
pub struct GraalIsolateThread {
    _private: [u8; 0],
}

type CreateIsolateFn = unsafe extern "C" fn(
    params: *mut c_void,
    isolate: *mut *mut GraalIsolate,
    thread: *mut *mut GraalIsolateThread,
) -> c_int;

type TearDownIsolateFn = unsafe extern "C" fn(thread: *mut GraalIsolateThread) -> c_int;

type EntryPointFn = unsafe extern "C" fn(thread: *mut GraalIsolateThread);

/// Isolate thread attached by `graal_create_isolate`
#[derive(Debug)]
pub struct IsolateThread {
    isolate: NonNull<GraalIsolate>,
    thread: NonNull<GraalIsolateThread>,
}

impl IsolateThread {
    pub fn isolate_ptr(&self) -> *mut GraalIsolate {
        self.isolate.as_ptr()
    }

    pub fn thread_ptr(&self) -> *mut GraalIsolateThread {
        self.thread.as_ptr()
    }
}

/// A native-image library with its isolate API and one entry point resolved
pub struct NativeImageLibrary {
    path: PathBuf,
    entry: String,
    create_isolate: CreateIsolateFn,
    tear_down_isolate: TearDownIsolateFn,
    entry_point: EntryPointFn,
    _lib: Library,
}

impl std::fmt::Debug for NativeImageLibrary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NativeImageLibrary")
            .field("path", &self.path)
            .field("entry", &self.entry)
            .finish()
    }
}

impl NativeImageLibrary {
    /// Open the library at `path` and resolve the isolate API and `entry`
    pub fn open(
        path: &Path,
        entry: &str,
    ) -> Result<Self, LibraryError> {
        debug!("loading native image {} entry={}", path.display(), entry);
        let lib = open_library(path)?;

        let (create_isolate, tear_down_isolate, entry_point) = unsafe {
            (
                load_symbol::<CreateIsolateFn>(&lib, path, "graal_create_isolate")?,
                load_symbol::<TearDownIsolateFn>(&lib, path, "graal_tear_down_isolate")?,
                load_symbol::<EntryPointFn>(&lib, path, entry)?,
            )
        };

        Ok(Self {
            path: path.to_path_buf(),
            entry: entry.to_string(),
            create_isolate,
            tear_down_isolate,
            entry_point,
            _lib: lib,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IsolateRuntime for NativeImageLibrary {
    type Thread = IsolateThread;

    fn entry_name(&self) -> &str {
        &self.entry
    }

    fn create_isolate(&self) -> Result<IsolateThread, i32> {
        let mut isolate: *mut GraalIsolate = ptr::null_mut();
        let mut thread: *mut GraalIsolateThread = ptr::null_mut();

        let status = unsafe { (self.create_isolate)(ptr::null_mut(), &mut isolate, &mut thread) };
        if status != 0 {
            return Err(status);
        }

        match (NonNull::new(isolate), NonNull::new(thread)) {
            (Some(isolate), Some(thread)) => {
                let thread = IsolateThread { isolate, thread };
                debug!(
                    "isolate {:p} attached thread {:p}",
                    thread.isolate_ptr(),
                    thread.thread_ptr()
                );
                Ok(thread)
            }
            _ => Err(-1),
        }
    }

    fn call_entry(
        &self,
        thread: &IsolateThread,
    ) {
        unsafe { (self.entry_point)(thread.thread_ptr()) }
    }

    fn tear_down(
        &self,
        thread: IsolateThread,
    ) -> i32 {
        unsafe { (self.tear_down_isolate)(thread.thread_ptr()) }
    }
}
