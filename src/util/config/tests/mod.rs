//! Configuration tests

use std::collections::HashMap;

use crate::util::config::{load_config, save_config, ConfigError, EventLoopConfig, RuntimeConfig};
use crate::util::logger::{self, LogLevel};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = RuntimeConfig::default();
    assert_eq!(config.event_loop.max_turns, Some(1_000_000));
    assert!(!config.event_loop.trace_turns);
    assert_eq!(config.log.level, "info");
    assert_eq!(config.log.log_level().unwrap(), LogLevel::Info);
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(RuntimeConfig::from_toml_str("").unwrap(), RuntimeConfig::default());
}

#[test]
fn test_partial_document() {
    let config = RuntimeConfig::from_toml_str(
        r#"
        [event_loop]
        trace_turns = true

        [log]
        level = "debug"
        "#,
    )
    .unwrap();
    assert!(config.event_loop.trace_turns);
    assert_eq!(config.event_loop.max_turns, Some(1_000_000));
    assert_eq!(config.log.log_level().unwrap(), LogLevel::Debug);
}

#[test]
fn test_invalid_documents() {
    assert!(matches!(
        RuntimeConfig::from_toml_str("[event_loop]\nmax_turns = \"many\"\n"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        RuntimeConfig::from_toml_str("[log]\nlevel = \"loud\"\n"),
        Err(ConfigError::UnknownLogLevel(_))
    ));
}

#[test]
fn test_overrides() {
    let config = RuntimeConfig::default()
        .with_overrides(lookup(&[("THENABLE_MAX_TURNS", "25"), ("THENABLE_LOG", "WARN")]))
        .unwrap();
    assert_eq!(config.event_loop.max_turns, Some(25));
    assert_eq!(config.log.level, "warn");

    let unbounded = RuntimeConfig::default()
        .with_overrides(lookup(&[("THENABLE_MAX_TURNS", "none")]))
        .unwrap();
    assert_eq!(unbounded.event_loop, EventLoopConfig::unbounded());
}

#[test]
fn test_invalid_overrides() {
    assert!(matches!(
        RuntimeConfig::default().with_overrides(lookup(&[("THENABLE_MAX_TURNS", "-1")])),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        RuntimeConfig::default().with_overrides(lookup(&[("THENABLE_LOG", "chatty")])),
        Err(ConfigError::UnknownLogLevel(_))
    ));
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("thenable.toml");
    let mut config = RuntimeConfig::default();
    config.event_loop.max_turns = Some(64);
    config.log.level = "error".to_string();

    save_config(&config, &path).unwrap();
    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.event_loop.max_turns, config.event_loop.max_turns);
}

#[test]
fn test_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded.log, RuntimeConfig::default().log);
}

#[test]
fn test_log_level_parsing() {
    assert_eq!("Trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert!("verbose".parse::<LogLevel>().is_err());
}

#[test]
fn test_documented_log_levels_load() {
    for (level, expected) in [
        ("trace", LogLevel::Trace),
        ("debug", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("warning", LogLevel::Warn),
        ("ERROR", LogLevel::Error),
    ] {
        let config = RuntimeConfig::from_toml_str(&format!("[log]\nlevel = \"{}\"\n", level)).unwrap();
        assert_eq!(config.log.log_level().unwrap(), expected);
    }
}

#[test]
fn test_logger_rejects_bad_config() {
    let mut config = RuntimeConfig::default().log;
    config.level = "shout".to_string();
    let err = logger::init_with_config(&config).unwrap_err();
    assert!(err.to_string().contains("invalid log level"));
}
