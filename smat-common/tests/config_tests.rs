//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate `SMAT_CONFIG` are marked with #[serial] so they
//! never race each other on the process environment.

use serial_test::serial;
use smat_common::config::{AppConfig, ConfigResolver, ConfigSource, CONFIG_ENV_VAR};
use std::env;
use std::io::Write;

const SAMPLE: &str = r#"
[server]
host = "0.0.0.0"
port = 8080

[session]
cookie_max_age_secs = 600
ttl_secs = 900

[llm]
api_key = "sk-test"
summary_model = "gpt-4o"

[debug]
enabled = true
default_score = 4

[[users]]
username = "faiz"
password = "envizi"
name = "Faiz"
company = "Apex Manufacturing"
industry = "Chemical Manufacturing"
revenue = "$75M-$100M"
location = "Kuala Lumpur, Malaysia"
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_sample_config_parses_every_section() {
    let config = AppConfig::from_toml_str(SAMPLE).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.session.cookie_max_age_secs, 600);
    assert_eq!(config.session.ttl_secs, Some(900));
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.llm.summary_model, "gpt-4o");
    // Unspecified fields keep their defaults
    assert_eq!(config.llm.insights_model, "gpt-4");
    assert!(config.debug.enabled);
    assert_eq!(config.debug.default_score, 4);

    let user = config.find_user("faiz").expect("user configured");
    assert_eq!(user.company, "Apex Manufacturing");
    assert_eq!(user.location, "Kuala Lumpur, Malaysia");
    assert!(config.find_user("nobody").is_none());
}

#[test]
#[serial]
fn test_cli_path_wins_over_environment() {
    let cli_file = write_config("[server]\nport = 7001\n");
    let env_file = write_config("[server]\nport = 7002\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let resolver = ConfigResolver::new(Some(cli_file.path().to_path_buf()));
    assert_eq!(
        resolver.resolve(),
        ConfigSource::CommandLine(cli_file.path().to_path_buf())
    );
    let config = resolver.load().unwrap();
    assert_eq!(config.server.port, 7001);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_path_used_without_cli() {
    let env_file = write_config("[server]\nport = 7002\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let resolver = ConfigResolver::new(None);
    let config = resolver.load().unwrap();
    assert_eq!(config.server.port, 7002);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let resolver = ConfigResolver::new(Some("/nonexistent/smat-test.toml".into()));
    assert!(resolver.load().is_err());
}

#[test]
#[serial]
fn test_missing_file_named_by_environment_is_error() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/smat-env-test.toml");
    let resolver = ConfigResolver::new(None);
    let err = resolver.load().unwrap_err();
    assert!(err.to_string().contains("/nonexistent/smat-env-test.toml"));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_malformed_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let bad = write_config("[server\nport = ");
    let resolver = ConfigResolver::new(Some(bad.path().to_path_buf()));
    assert!(resolver.load().is_err());
}

#[test]
#[serial]
fn test_invalid_values_rejected_at_load() {
    env::remove_var(CONFIG_ENV_VAR);
    let file = write_config("[debug]\ndefault_score = 9\n");
    let resolver = ConfigResolver::new(Some(file.path().to_path_buf()));
    assert!(resolver.load().is_err());
}
