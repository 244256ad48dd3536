//! Scenario sequencing unit tests

use std::path::Path;

use crate::host::{run_with, HostError, LibraryProvider, RunRequest, RuntimeProvider, Scenario};
use crate::locate::{Arch, Os, Platform};
use crate::runtime::jvm::JvmOptions;
use crate::runtime::testing::{entries, new_log, CallLog, FakeIsolate, FakeJvm, JniStep};
use crate::util::config::HostConfig;

struct FakeProvider {
    log: CallLog,
    isolate_status: i32,
    jni_fail_at: Option<JniStep>,
    missing_library: bool,
}

impl FakeProvider {
    fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            isolate_status: 0,
            jni_fail_at: None,
            missing_library: false,
        }
    }
}

impl RuntimeProvider for FakeProvider {
    type Isolate = FakeIsolate;
    type Launcher = FakeJvm;

    fn isolate(&self) -> Result<FakeIsolate, HostError> {
        self.log.borrow_mut().push("load isolate".to_string());
        Ok(FakeIsolate::failing(&self.log, self.isolate_status))
    }

    fn launcher(&self) -> Result<FakeJvm, HostError> {
        self.log.borrow_mut().push("load jvm".to_string());
        if self.missing_library {
            return Err(HostError::Locate(crate::locate::LocateError::NoLibjvm {
                home: "/opt/jdk".into(),
            }));
        }
        let mut jvm = FakeJvm::new(&self.log);
        jvm.fail_at = self.jni_fail_at;
        Ok(jvm)
    }
}

fn run(
    provider: &FakeProvider,
    scenario: Scenario,
) -> (Result<(), HostError>, String) {
    let request = RunRequest {
        scenario,
        ..RunRequest::default()
    };
    let mut out = Vec::new();
    let result = run_with(provider, &request, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_all_runs_isolate_then_jni() {
    let log = new_log();
    let (result, out) = run(&FakeProvider::new(&log), Scenario::All);

    assert!(result.is_ok());
    assert_eq!(
        out,
        "=== ISOLATE\n\
         starting up!\n\
         graal initialized!\n\
         noop called!\n\
         === JNI\n\
         starting up!\n\
         creating JVM!\n\
         JVM created!\n\
         noop called!\n"
    );
    let log = entries(&log);
    let isolate_done = log
        .iter()
        .position(|e| e == "graal_tear_down_isolate(7)")
        .unwrap();
    let jvm_loaded = log.iter().position(|e| e == "load jvm").unwrap();
    assert!(isolate_done < jvm_loaded);
}

#[test]
fn test_all_stops_after_isolate_failure() {
    let log = new_log();
    let mut provider = FakeProvider::new(&log);
    provider.isolate_status = 1;

    let (result, out) = run(&provider, Scenario::All);

    assert!(matches!(result, Err(HostError::IsolateCreate { status: 1 })));
    assert_eq!(out, "=== ISOLATE\nstarting up!\ninitialization error\n");
    assert!(!entries(&log).contains(&"load jvm".to_string()));
}

#[test]
fn test_jni_failure_prints_diagnostic_last() {
    let log = new_log();
    let mut provider = FakeProvider::new(&log);
    provider.jni_fail_at = Some(JniStep::FindClass);

    let (result, out) = run(&provider, Scenario::All);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(out.ends_with("JVM created!\nFailed to find class MyJavaClass\n"));
}

#[test]
fn test_single_scenarios_skip_headers() {
    let log = new_log();
    let provider = FakeProvider::new(&log);

    let (_, isolate_out) = run(&provider, Scenario::Isolate);
    assert_eq!(
        isolate_out,
        "starting up!\ngraal initialized!\nnoop called!\n"
    );
    assert!(!entries(&log).contains(&"load jvm".to_string()));

    let (_, jni_out) = run(&provider, Scenario::Jni);
    assert!(jni_out.starts_with("starting up!\ncreating JVM!\n"));
}

#[test]
fn test_locate_failure_is_reported() {
    let log = new_log();
    let mut provider = FakeProvider::new(&log);
    provider.missing_library = true;

    let (result, out) = run(&provider, Scenario::Jni);

    assert!(matches!(result, Err(HostError::Locate(_))));
    assert_eq!(out, "no libjvm found under /opt/jdk\n");
}

#[test]
fn test_invalid_option_fails_before_loading_jvm() {
    let log = new_log();
    let provider = FakeProvider::new(&log);
    let request = RunRequest {
        scenario: Scenario::Jni,
        options: JvmOptions::default().option("-Dx=\0"),
        ..RunRequest::default()
    };
    let mut out = Vec::new();

    let result = run_with(&provider, &request, &mut out);

    assert!(matches!(result, Err(HostError::InvalidOption(_))));
    assert!(entries(&log).is_empty());
}

#[test]
fn test_request_from_config() {
    let config = HostConfig::from_toml(
        r#"
        [jvm]
        class = "org.demo.Main"
        method = "tick"
        options = ["-Xmx64m"]
        "#,
    )
    .unwrap();

    let request = RunRequest::from_config(Scenario::Jni, &config);

    assert_eq!(request.scenario, Scenario::Jni);
    assert_eq!(request.target.class, "org.demo.Main");
    assert_eq!(request.target.internal_class_name(), "org/demo/Main");
    assert_eq!(request.target.method, "tick");
    assert_eq!(request.options.options, vec!["-Xmx64m"]);
}

#[test]
fn test_library_provider_paths() {
    let platform = Platform {
        os: Os::Linux,
        arch: Arch::X64,
    };
    let config = HostConfig::default();
    let provider = LibraryProvider::new(&config, Path::new("/work"), platform);

    assert_eq!(provider.native_image, Path::new("/work/libkotlin-lib.so"));
    assert_eq!(provider.entry_point, "noop");
    assert!(matches!(
        provider.isolate(),
        Err(HostError::Library(_))
    ));
}
