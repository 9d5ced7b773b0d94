use std::io::Write;

use delve_core::config::{LogFormat, DEFAULT_FAIL_MARKER, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL};
use delve_core::{Config, ConfigError, ErrorPolicy};
use tempfile::{tempdir, NamedTempFile};

const ENV_VARS: [&str; 4] = [
    "DELVE_SUPERVISOR_ERROR_POLICY",
    "DELVE_LOG_LEVEL",
    "DELVE_LOG_FORMAT",
    "DELVE_RESEARCHER_FAIL_MARKER",
];

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::RecordAndContinue);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    assert_eq!(config.logging.format, DEFAULT_LOG_FORMAT);
    assert_eq!(config.researcher.fail_marker, DEFAULT_FAIL_MARKER);
}

#[test]
fn test_config_to_toml() {
    let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
    assert!(toml_str.contains("[supervisor]"));
    assert!(toml_str.contains("[logging]"));
    assert!(toml_str.contains("[researcher]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[supervisor]
error_policy = "fail_fast"

[logging]
level = "delve_core=debug"
format = "json"
"#;
    let config = Config::from_toml(toml_str).unwrap();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::FailFast);
    assert_eq!(config.logging.level, "delve_core=debug");
    assert_eq!(config.logging.log_format().unwrap(), LogFormat::Json);
    assert_eq!(config.researcher.fail_marker, DEFAULT_FAIL_MARKER);
}

#[test]
fn test_unknown_policy_rejected_at_load() {
    let toml_str = r#"
[supervisor]
error_policy = "retry_forever"
"#;
    let result = Config::from_toml(toml_str);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_unknown_log_format_rejected_at_load() {
    let toml_str = r#"
[logging]
format = "xml"
"#;
    let result = Config::from_toml(toml_str);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_empty_sections_use_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::RecordAndContinue);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_env_overrides() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[supervisor]\nerror_policy = \"record_and_continue\"\n\n[researcher]\nfail_marker = \"BOOM\""
    )
    .unwrap();

    // Environment variables are process-wide, so every env case lives in this one test.
    let config_home = tempdir().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());
    for var in ENV_VARS {
        std::env::remove_var(var);
    }

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::RecordAndContinue);
    assert_eq!(config.researcher.fail_marker, "BOOM");

    std::env::set_var("DELVE_SUPERVISOR_ERROR_POLICY", "fail_fast");
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::FailFast);

    std::env::set_var("DELVE_SUPERVISOR_ERROR_POLICY", "sometimes");
    let result = Config::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnknownPolicy(_))));

    // No config file anywhere: defaults plus env.
    std::env::set_var("DELVE_SUPERVISOR_ERROR_POLICY", "fail_fast");
    std::env::set_var("DELVE_LOG_LEVEL", "debug");
    std::env::set_var("DELVE_LOG_FORMAT", "json");
    let config = Config::load().unwrap();
    assert_eq!(config.supervisor.error_policy, ErrorPolicy::FailFast);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.log_format().unwrap(), LogFormat::Json);
    assert_eq!(config.researcher.fail_marker, DEFAULT_FAIL_MARKER);

    std::env::set_var("DELVE_LOG_FORMAT", "xml");
    assert!(matches!(Config::load(), Err(ConfigError::Invalid(_))));

    for var in ENV_VARS {
        std::env::remove_var(var);
    }
    std::env::remove_var("XDG_CONFIG_HOME");
}

#[test]
fn test_missing_file() {
    let result = Config::from_file("/definitely/not/here/delve.toml");
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}
