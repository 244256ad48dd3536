//! embed-host
//!
//! A native host that calls into managed code twice: once through a GraalVM
//! native-image isolate, once through a JVM created with the JNI invocation
//! API. Each run creates the runtime, makes one call, and tears it down.
//!
//! # Example
//!
//! ```no_run
//! use embed_host::{run, HostConfig, Scenario};
//!
//! fn main() -> embed_host::Result<()> {
//!     let cwd = std::env::current_dir()?;
//!     let mut stdout = std::io::stdout();
//!     run(&HostConfig::default(), Scenario::All, &cwd, &mut stdout)?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/embed-host")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod host;
pub mod locate;
pub mod runtime;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use host::{HostError, RunRequest, Scenario};
pub use util::config::HostConfig;

use ::std::io::Write;
use ::std::path::Path;
use tracing::debug;

use crate::host::LibraryProvider;
use crate::locate::Platform;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Program name
pub const NAME: &str = "embed-host";

/// Run `scenario` against the libraries described by `config`.
///
/// Relative library paths are resolved from `cwd`. Progress lines and the
/// diagnostic of a failure are written to `out`.
pub fn run(
    config: &HostConfig,
    scenario: Scenario,
    cwd: &Path,
    out: &mut dyn Write,
) -> ::std::result::Result<(), HostError> {
    let platform = match Platform::current() {
        Ok(platform) => platform,
        Err(err) => {
            writeln!(out, "{}", err)?;
            return Err(err.into());
        }
    };
    debug!("running {:?} on {}", scenario, platform);
    let provider = LibraryProvider::new(config, cwd, platform);
    let request = RunRequest::from_config(scenario, config);
    host::run_with(&provider, &request, out)
}
