//! Scenario sequencing
//!
//! Runs the isolate scenario, the JNI scenario, or both in order, and turns
//! any failure into a single diagnostic line on the output stream.
//!
//! ```text
//! === ISOLATE
//! starting up!
//! graal initialized!
//! noop called!
//! === JNI
//! starting up!
//! creating JVM!
//! JVM created!
//! noop called!
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error};

use crate::locate::{self, LocateError, Platform};
use crate::runtime::isolate::{run_in_isolate, IsolateRuntime, NativeImageLibrary};
use crate::runtime::jvm::{run_in_jni, InvalidOption, JavaTarget, JvmLauncher, JvmLibrary, JvmOptions};
use crate::runtime::LibraryError;
use crate::util::config::{HostConfig, JvmConfig};

/// Which runtimes to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Native-image isolate only
    Isolate,
    /// JVM through JNI only
    Jni,
    /// Isolate, then JNI; stops at the first failure
    #[default]
    All,
}

/// Host failures.
///
/// `Display` is the diagnostic printed for the user.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("initialization error")]
    IsolateCreate { status: i32 },
    #[error("Failed to create a new Java VM")]
    JvmCreate { status: i32 },
    #[error("Failed to find class {class}")]
    ClassNotFound { class: String },
    #[error("Failed to get {class} constructor")]
    ConstructorNotFound { class: String },
    #[error("Failed to create {class} instance")]
    InstantiationFailed { class: String },
    #[error("Failed to get {method} method")]
    MethodNotFound { method: String },
    #[error("{method} threw an exception")]
    MethodThrew { method: String },
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl HostError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Supplies the runtimes lazily, so a scenario only loads what it uses
pub trait RuntimeProvider {
    type Isolate: IsolateRuntime;
    type Launcher: JvmLauncher;

    fn isolate(&self) -> Result<Self::Isolate, HostError>;
    fn launcher(&self) -> Result<Self::Launcher, HostError>;
}

/// Provider backed by shared libraries found through [`crate::locate`]
#[derive(Debug, Clone)]
pub struct LibraryProvider {
    pub native_image: PathBuf,
    pub entry_point: String,
    pub jvm: JvmConfig,
    pub cwd: PathBuf,
    pub platform: Platform,
}

impl LibraryProvider {
    pub fn new(
        config: &HostConfig,
        cwd: &Path,
        platform: Platform,
    ) -> Self {
        Self {
            native_image: locate::native_image_library(&config.isolate, cwd, &platform),
            entry_point: config.isolate.entry_point.clone(),
            jvm: config.jvm.clone(),
            cwd: cwd.to_path_buf(),
            platform,
        }
    }
}

impl RuntimeProvider for LibraryProvider {
    type Isolate = NativeImageLibrary;
    type Launcher = JvmLibrary;

    fn isolate(&self) -> Result<NativeImageLibrary, HostError> {
        let library = NativeImageLibrary::open(&self.native_image, &self.entry_point)?;
        debug!("native image ready: {}", library.path().display());
        Ok(library)
    }

    fn launcher(&self) -> Result<JvmLibrary, HostError> {
        let path = locate::resolve_libjvm(&self.jvm, &self.cwd, &self.platform)?;
        let library = JvmLibrary::open(&path)?;
        debug!("libjvm ready: {}", library.path().display());
        Ok(library)
    }
}

/// What to run and with which JVM settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub scenario: Scenario,
    pub options: JvmOptions,
    pub target: JavaTarget,
}

impl RunRequest {
    pub fn from_config(
        scenario: Scenario,
        config: &HostConfig,
    ) -> Self {
        Self {
            scenario,
            options: JvmOptions::from_config(&config.jvm),
            target: JavaTarget::new(config.jvm.class.clone(), config.jvm.method.clone()),
        }
    }
}

/// Run `request`, printing the diagnostic of a failure to `out`
pub fn run_with<P: RuntimeProvider>(
    provider: &P,
    request: &RunRequest,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    let result = dispatch(provider, request, out);
    if let Err(err) = &result {
        error!("{}", err);
        if !matches!(err, HostError::Io(_)) {
            writeln!(out, "{}", err)?;
        }
    }
    out.flush()?;
    result
}

fn dispatch<P: RuntimeProvider>(
    provider: &P,
    request: &RunRequest,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    match request.scenario {
        Scenario::Isolate => isolate_phase(provider, out),
        Scenario::Jni => jni_phase(provider, request, out),
        Scenario::All => {
            writeln!(out, "=== ISOLATE")?;
            isolate_phase(provider, out)?;
            writeln!(out, "=== JNI")?;
            jni_phase(provider, request, out)
        }
    }
}

fn isolate_phase<P: RuntimeProvider>(
    provider: &P,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    let runtime = provider.isolate()?;
    run_in_isolate(&runtime, out)
}

fn jni_phase<P: RuntimeProvider>(
    provider: &P,
    request: &RunRequest,
    out: &mut dyn Write,
) -> Result<(), HostError> {
    request.options.validate()?;
    let launcher = provider.launcher()?;
    run_in_jni(&launcher, &request.options, &request.target, out)
}

#[cfg(test)]
mod tests;
