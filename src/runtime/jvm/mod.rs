//! JNI scenario
//!
//! Creates a JVM through the invocation API, instantiates one class with its
//! no-argument constructor, calls one `()V` method on it, and destroys the VM.
//!
//! # Sequence
//!
//! ```text
//! JNI_CreateJavaVM ─► FindClass ─► GetMethodID(<init>) ─► NewObjectA
//!        ─► GetMethodID(method) ─► CallVoidMethodA ─► DeleteLocalRef ─► DestroyJavaVM
//! ```
//!
//! The host API sits behind [`JvmLauncher`] and [`JniSession`] so the sequence
//! runs unchanged against a real `libjvm` ([`JvmLibrary`]) or a scripted fake.

pub mod library;
pub mod options;
pub mod version;

use std::io::Write;

use tracing::{debug, warn};

use crate::host::HostError;

pub use library::{JavaVm, JvmLibrary};
pub use options::{InitArgs, InvalidOption, JvmOptions};
pub use version::JniVersion;

/// Descriptor of a no-argument method returning void
pub const VOID_SIGNATURE: &str = "()V";

/// Name JNI uses for constructors
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Creates JVM sessions
pub trait JvmLauncher {
    type Session: JniSession;

    /// Create a VM; `Err` carries the status returned by `JNI_CreateJavaVM`
    fn create(
        &self,
        options: &JvmOptions,
    ) -> Result<Self::Session, i32>;
}

/// The slice of the JNI function table the host needs.
///
/// `LocalRef` covers both classes and objects, as `jclass` is a `jobject` in
/// JNI.
pub trait JniSession {
    type LocalRef;
    type Method: Copy;

    fn exception_check(&mut self) -> bool;
    fn exception_describe(&mut self);
    fn exception_clear(&mut self);

    fn find_class(
        &mut self,
        internal_name: &str,
    ) -> Option<Self::LocalRef>;

    fn method_id(
        &mut self,
        class: &Self::LocalRef,
        name: &str,
        signature: &str,
    ) -> Option<Self::Method>;

    fn new_object(
        &mut self,
        class: &Self::LocalRef,
        constructor: Self::Method,
    ) -> Option<Self::LocalRef>;

    fn call_void_method(
        &mut self,
        object: &Self::LocalRef,
        method: Self::Method,
    );

    fn delete_local_ref(
        &mut self,
        local: Self::LocalRef,
    );

    /// `DestroyJavaVM`; `Err` carries its nonzero status
    fn destroy(self) -> Result<(), i32>;

    /// Describe and clear a pending exception, reporting whether there was one
    fn take_pending_exception(&mut self) -> bool {
        if self.exception_check() {
            self.exception_describe();
            self.exception_clear();
            true
        } else {
            false
        }
    }
}

/// Class and method invoked by the JNI scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaTarget {
    /// Binary class name, dotted or slashed
    pub class: String,
    /// Instance method with signature `()V`
    pub method: String,
}

impl Default for JavaTarget {
    fn default() -> Self {
        Self {
            class: "MyJavaClass".to_string(),
            method: "noop".to_string(),
        }
    }
}

impl JavaTarget {
    pub fn new(
        class: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Class name in the form `FindClass` expects
    pub fn internal_class_name(&self) -> String {
        internal_class_name(&self.class)
    }
}

/// Convert `com.example.Foo` to `com/example/Foo`
pub fn internal_class_name(binary_name: &str) -> String {
    binary_name.replace('.', "/")
}

/// Run the JNI scenario, writing progress lines to `out`.
///
/// The VM is destroyed on every path once it was created. Printing the
/// diagnostic of a returned error is left to the caller.
pub fn run_in_jni<L: JvmLauncher>(
    launcher: &L,
    options: &JvmOptions,
    target: &JavaTarget,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    writeln!(out, "starting up!")?;
    writeln!(out, "creating JVM!")?;

    debug!(
        "creating JVM version={} options={:?}",
        options.version,
        options.option_strings()
    );
    let mut session = match launcher.create(options) {
        Ok(session) => session,
        Err(status) => {
            debug!("JNI_CreateJavaVM returned {}", status);
            return Err(HostError::JvmCreate { status });
        }
    };

    if session.take_pending_exception() {
        debug!("cleared exception pending after VM creation");
    }

    writeln!(out, "JVM created!")?;

    let invoked = invoke_target(&mut session, target, out);

    if let Err(status) = session.destroy() {
        warn!("DestroyJavaVM returned {}", status);
    }

    invoked
}

fn invoke_target<S: JniSession>(
    session: &mut S,
    target: &JavaTarget,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    let internal = target.internal_class_name();
    debug!("FindClass {}", internal);
    let Some(class) = session.find_class(&internal) else {
        session.take_pending_exception();
        return Err(HostError::ClassNotFound {
            class: target.class.clone(),
        });
    };

    let result = invoke_on_class(session, &class, target, out);
    session.delete_local_ref(class);
    result
}

fn invoke_on_class<S: JniSession>(
    session: &mut S,
    class: &S::LocalRef,
    target: &JavaTarget,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    let Some(constructor) = session.method_id(class, CONSTRUCTOR_NAME, VOID_SIGNATURE) else {
        session.take_pending_exception();
        return Err(HostError::ConstructorNotFound {
            class: target.class.clone(),
        });
    };

    let Some(object) = session.new_object(class, constructor) else {
        session.take_pending_exception();
        return Err(HostError::InstantiationFailed {
            class: target.class.clone(),
        });
    };

    let result = call_method(session, class, &object, target, out);
    session.delete_local_ref(object);
    result
}

fn call_method<S: JniSession>(
    session: &mut S,
    class: &S::LocalRef,
    object: &S::LocalRef,
    target: &JavaTarget,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    let Some(method) = session.method_id(class, &target.method, VOID_SIGNATURE) else {
        session.take_pending_exception();
        return Err(HostError::MethodNotFound {
            method: target.method.clone(),
        });
    };

    debug!("CallVoidMethod {}.{}", target.class, target.method);
    session.call_void_method(object, method);
    if session.take_pending_exception() {
        return Err(HostError::MethodThrew {
            method: target.method.clone(),
        });
    }

    writeln!(out, "{} called!", target.method)?;
    Ok(())
}
