//! `libjvm` through the JNI invocation API

use std::ffi::{c_void, CString};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use jni_sys::{
    jint, jmethodID, jobject, jvalue, JNIEnv, JavaVM, JavaVMInitArgs, JNI_EINVAL, JNI_ERR, JNI_OK,
    JNI_TRUE,
};
use libloading::Library;
use tracing::{debug, warn};

use super::{JniSession, JvmLauncher, JvmOptions};
use crate::runtime::{load_symbol, open_library, LibraryError};

type CreateJavaVmFn =
    unsafe extern "system" fn(*mut *mut JavaVM, *mut *mut c_void, *mut c_void) -> jint;

/// Call an entry of a JNI function table; `None` when the slot is empty.
macro_rules! jni_call {
    ($table:expr, $name:ident $(, $arg:expr)* $(,)?) => {
        match (**$table).$name {
            Some(f) => Some(f($table $(, $arg)*)),
            None => None,
        }
    };
}

/// A loaded `libjvm`
pub struct JvmLibrary {
    path: PathBuf,
    create_java_vm: CreateJavaVmFn,
    lib: Arc<Library>,
}

impl std::fmt::Debug for JvmLibrary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("JvmLibrary").field("path", &self.path).finish()
    }
}

impl JvmLibrary {
    /// Open `libjvm` at `path` and resolve `JNI_CreateJavaVM`
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        debug!("loading libjvm from {}", path.display());
        let lib = open_library(path)?;
        let create_java_vm = unsafe { load_symbol::<CreateJavaVmFn>(&lib, path, "JNI_CreateJavaVM")? };
        Ok(Self {
            path: path.to_path_buf(),
            create_java_vm,
            lib: Arc::new(lib),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JvmLauncher for JvmLibrary {
    type Session = JavaVm;

    fn create(
        &self,
        options: &JvmOptions,
    ) -> Result<JavaVm, i32> {
        let mut init = options.to_init_args().map_err(|err| {
            warn!("{}", err);
            JNI_EINVAL
        })?;
        let mut raw = init.as_raw();

        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut env: *mut c_void = ptr::null_mut();
        let status = unsafe {
            (self.create_java_vm)(&mut vm, &mut env, &mut raw as *mut JavaVMInitArgs as *mut c_void)
        };

        if status != JNI_OK {
            return Err(status);
        }
        if vm.is_null() || env.is_null() {
            return Err(JNI_ERR);
        }

        Ok(JavaVm {
            vm,
            env: env as *mut JNIEnv,
            _lib: Arc::clone(&self.lib),
        })
    }
}

/// Local reference to a class or object
#[derive(Debug)]
pub struct LocalRef(jobject);

/// Method ID returned by `GetMethodID`
#[derive(Debug, Clone, Copy)]
pub struct MethodId(jmethodID);

/// A live VM and the environment of the thread that created it.
///
/// Dropping it destroys the VM if [`JniSession::destroy`] was not called.
pub struct JavaVm {
    vm: *mut JavaVM,
    env: *mut JNIEnv,
    _lib: Arc<Library>,
}

impl JavaVm {
    fn destroy_raw(&mut self) -> jint {
        if self.vm.is_null() {
            return JNI_OK;
        }
        let vm = std::mem::replace(&mut self.vm, ptr::null_mut());
        self.env = ptr::null_mut();
        unsafe { jni_call!(vm, DestroyJavaVM) }.unwrap_or(JNI_ERR)
    }
}

impl Drop for JavaVm {
    fn drop(&mut self) {
        let status = self.destroy_raw();
        if status != JNI_OK {
            warn!("DestroyJavaVM returned {}", status);
        }
    }
}

impl JniSession for JavaVm {
    type LocalRef = LocalRef;
    type Method = MethodId;

    fn exception_check(&mut self) -> bool {
        unsafe { jni_call!(self.env, ExceptionCheck) }
            .map(|pending| pending == JNI_TRUE)
            .unwrap_or(false)
    }

    fn exception_describe(&mut self) {
        unsafe { jni_call!(self.env, ExceptionDescribe) };
    }

    fn exception_clear(&mut self) {
        unsafe { jni_call!(self.env, ExceptionClear) };
    }

    fn find_class(
        &mut self,
        internal_name: &str,
    ) -> Option<LocalRef> {
        let name = CString::new(internal_name).ok()?;
        let class = unsafe { jni_call!(self.env, FindClass, name.as_ptr()) }?;
        (!class.is_null()).then_some(LocalRef(class))
    }

    fn method_id(
        &mut self,
        class: &LocalRef,
        name: &str,
        signature: &str,
    ) -> Option<MethodId> {
        let name = CString::new(name).ok()?;
        let signature = CString::new(signature).ok()?;
        let id = unsafe {
            jni_call!(self.env, GetMethodID, class.0, name.as_ptr(), signature.as_ptr())
        }?;
        (!id.is_null()).then_some(MethodId(id))
    }

    fn new_object(
        &mut self,
        class: &LocalRef,
        constructor: MethodId,
    ) -> Option<LocalRef> {
        let args: [jvalue; 0] = [];
        let object = unsafe { jni_call!(self.env, NewObjectA, class.0, constructor.0, args.as_ptr()) }?;
        (!object.is_null()).then_some(LocalRef(object))
    }

    fn call_void_method(
        &mut self,
        object: &LocalRef,
        method: MethodId,
    ) {
        let args: [jvalue; 0] = [];
        unsafe { jni_call!(self.env, CallVoidMethodA, object.0, method.0, args.as_ptr()) };
    }

    fn delete_local_ref(
        &mut self,
        local: LocalRef,
    ) {
        unsafe { jni_call!(self.env, DeleteLocalRef, local.0) };
    }

    fn destroy(mut self) -> Result<(), i32> {
        match self.destroy_raw() {
            JNI_OK => Ok(()),
            status => Err(status),
        }
    }
}
