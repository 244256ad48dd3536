//! Error handling integration tests
//!
//! Runs the real library-backed host against paths that do not exist and
//! checks the diagnostic and exit status.

use std::path::PathBuf;

use embed_host::locate::Platform;
use embed_host::{run, HostConfig, HostError, Scenario};
use tempfile::TempDir;

fn run_to_string(
    config: &HostConfig,
    scenario: Scenario,
) -> (Result<(), HostError>, String) {
    let cwd = TempDir::new().unwrap();
    let mut out = Vec::new();
    let result = run(config, scenario, cwd.path(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_missing_native_image_library() {
    let mut config = HostConfig::default();
    config.isolate.library = Some(PathBuf::from("/nonexistent/libkotlin-lib.so"));

    let (result, out) = run_to_string(&config, Scenario::Isolate);

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    if Platform::current().is_ok() {
        assert!(matches!(err, HostError::Library(_)));
        assert!(out.starts_with("failed to load /nonexistent/libkotlin-lib.so"));
        assert_eq!(out.lines().count(), 1);
    }
}

#[test]
fn test_missing_libjvm() {
    let mut config = HostConfig::default();
    config.jvm.library = Some(PathBuf::from("/nonexistent/lib/server/libjvm.so"));

    let (result, out) = run_to_string(&config, Scenario::Jni);

    assert_eq!(result.unwrap_err().exit_code(), 1);
    if Platform::current().is_ok() {
        assert!(out.contains("/nonexistent/lib/server/libjvm.so"));
        assert!(!out.contains("creating JVM!"));
    }
}

#[test]
fn test_no_java_home_in_empty_directory() {
    let mut config = HostConfig::default();
    config.jvm.java_home = None;

    let (result, out) = run_to_string(&config, Scenario::Jni);

    assert!(result.is_err());
    if Platform::current().is_ok() {
        assert!(out.starts_with("no Java home configured and no GraalVM found in"));
    }
}

#[test]
fn test_all_stops_at_isolate_failure() {
    let mut config = HostConfig::default();
    config.isolate.library = Some(PathBuf::from("/nonexistent/libkotlin-lib.so"));

    let (result, out) = run_to_string(&config, Scenario::All);

    assert!(result.is_err());
    if Platform::current().is_ok() {
        assert!(out.starts_with("=== ISOLATE\n"));
        assert!(!out.contains("=== JNI"));
    }
}
