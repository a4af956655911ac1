//! Integration tests for the Config::from_file_with_env pipeline.
//!
//! TOML file -> raw parse -> env var expansion -> final Config with KeySource.
//! Each test uses its own env var names to avoid parallel test interference.

use std::io::Write;

use sealradio::config::{Config, ConfigError, KeySource};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_file_env_expansion_resolves_var() {
    let var_name = "SEALRADIO_E2E_EXPAND_KEY";
    unsafe { std::env::set_var(var_name, "AIzaResolved") };

    let file = write_config(&format!(
        r#"
[server]
listen = "127.0.0.1:19876"

[upstream]
api_key = "${{{}}}"
"#,
        var_name
    ));

    let (config, source) = Config::from_file_with_env(file.path()).expect("load config");

    assert_eq!(config.server.listen, "127.0.0.1:19876");
    assert_eq!(source, KeySource::EnvExpanded);
    assert_eq!(
        config.upstream.api_key.as_ref().unwrap().expose_secret(),
        "AIzaResolved"
    );

    unsafe { std::env::remove_var(var_name) };
}

#[test]
fn test_file_missing_var_names_variable() {
    let var_name = "SEALRADIO_E2E_DEFINITELY_MISSING";
    unsafe { std::env::remove_var(var_name) };

    let file = write_config(&format!(
        r#"
[upstream]
api_key = "${{{}}}"
"#,
        var_name
    ));

    let err = Config::from_file_with_env(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvVar { .. }));
    assert!(err.to_string().contains(var_name), "error: {}", err);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Config::from_file_with_env("/nonexistent/sealradio/config.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/sealradio/config.toml"));
}

#[test]
fn test_literal_key_is_never_printed() {
    let file = write_config(
        r#"
[upstream]
base_url = "http://localhost:8081/v1beta"
api_key = "AIzaLiteralSecret"
"#,
    );

    let (config, source) = Config::from_file_with_env(file.path()).expect("load config");

    assert_eq!(source, KeySource::Literal);
    let debug = format!("{:?}", config);
    assert!(!debug.contains("AIzaLiteralSecret"));
    assert!(debug.contains("[REDACTED]"));
}
