//! GraalVM isolate scenario
//!
//! Creates an isolate inside a native-image shared library, calls one
//! `@CEntryPoint` function with the isolate thread, and tears the isolate
//! down again.
//!
//! The entry point has the C shape generated by `native-image --shared` for a
//! static void method taking only an `IsolateThread`:
//!
//! ```c
//! void noop(graal_isolatethread_t* thread);
//! ```

pub mod library;

use std::io::Write;

use tracing::{debug, warn};

use crate::host::HostError;

pub use library::{IsolateThread, NativeImageLibrary};

/// The isolate half of the GraalVM C API
pub trait IsolateRuntime {
    type Thread;

    /// Name of the entry point [`IsolateRuntime::call_entry`] invokes
    fn entry_name(&self) -> &str;

    /// `graal_create_isolate`; `Err` carries its nonzero status
    fn create_isolate(&self) -> Result<Self::Thread, i32>;

    /// Call the entry point on `thread`
    fn call_entry(
        &self,
        thread: &Self::Thread,
    );

    /// `graal_tear_down_isolate`; returns its status
    fn tear_down(
        &self,
        thread: Self::Thread,
    ) -> i32;
}

/// Run the isolate scenario, writing progress lines to `out`.
///
/// Printing the diagnostic of a returned error is left to the caller.
pub fn run_in_isolate<R: IsolateRuntime>(
    runtime: &R,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    writeln!(out, "starting up!")?;

    let thread = match runtime.create_isolate() {
        Ok(thread) => thread,
        Err(status) => {
            debug!("graal_create_isolate returned {}", status);
            return Err(HostError::IsolateCreate { status });
        }
    };

    writeln!(out, "graal initialized!")?;

    debug!("calling entry point {}", runtime.entry_name());
    runtime.call_entry(&thread);

    let written = writeln!(out, "{} called!", runtime.entry_name());

    let status = runtime.tear_down(thread);
    if status != 0 {
        warn!("graal_tear_down_isolate returned {}", status);
    }

    written.map_err(HostError::from)
}
