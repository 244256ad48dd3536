//! Configuration integration tests
//!
//! Loads a project file, layers environment overrides on top, and checks the
//! resulting run request.

use std::fs;
use std::path::PathBuf;

use embed_host::runtime::jvm::JniVersion;
use embed_host::util::config::{
    load_config_with_user, ConfigSource, ENV_JAVA_HOME, ENV_JVM_LIB, PROJECT_CONFIG_FILE,
};
use embed_host::{RunRequest, Scenario};
use tempfile::TempDir;

const PROJECT: &str = r#"
[isolate]
entry_point = "noop"

[jvm]
java_home = "/opt/graalvm-25"
class_path = ["build/libs/kotlin-lib.jar"]
options = ["-Xmx128m"]
class = "dev.example.MyJavaClass"
version = "10"
"#;

#[test]
fn test_project_file_and_env_build_request() {
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join(PROJECT_CONFIG_FILE), PROJECT).unwrap();

    let mut loaded = load_config_with_user(None, cwd.path(), None).unwrap();
    assert!(matches!(loaded.source, ConfigSource::Project(_)));

    loaded.config.apply_env(|key| match key {
        k if k == ENV_JVM_LIB => Some("/env/libjvm.so".to_string()),
        k if k == ENV_JAVA_HOME => Some("/usr/lib/jvm/default".to_string()),
        _ => None,
    });

    let config = loaded.config;
    assert_eq!(config.jvm.library, Some(PathBuf::from("/env/libjvm.so")));
    assert_eq!(config.jvm.java_home, Some(PathBuf::from("/opt/graalvm-25")));

    let request = RunRequest::from_config(Scenario::Jni, &config);
    assert_eq!(request.options.version, JniVersion::V10);
    assert_eq!(
        request.options.option_strings(),
        vec!["-Djava.class.path=build/libs/kotlin-lib.jar", "-Xmx128m"]
    );
    assert_eq!(request.target.internal_class_name(), "dev/example/MyJavaClass");
    assert_eq!(request.target.method, "noop");
}

#[test]
fn test_defaults_describe_the_demo_project() {
    let cwd = TempDir::new().unwrap();
    let loaded = load_config_with_user(None, cwd.path(), None).unwrap();

    let request = RunRequest::from_config(Scenario::All, &loaded.config);

    assert_eq!(loaded.source, ConfigSource::Default);
    assert_eq!(request.target.class, "MyJavaClass");
    assert!(request.options.option_strings().is_empty());
}
