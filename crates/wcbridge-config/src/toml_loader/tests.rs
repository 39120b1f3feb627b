//! Tests for TOML config reading, seeding, and path resolution.

use super::*;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = read_config(Path::new("/tmp/nonexistent_wcbridge_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, wcbridge_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[relay]
tab_url = "https://bridge.example.org"
ping_interval_ms = 250

[channel]
name = "wallet-bridge"
"#,
    )
    .unwrap();

    let config = read_config(&path).unwrap();
    assert_eq!(config.relay.tab_url, "https://bridge.example.org");
    assert_eq!(config.relay.ping_interval_ms, 250);
    assert_eq!(config.channel.name, "wallet-bridge");
    // Defaults preserved
    assert_eq!(config.relay.tab_name, "walletconnect-tab");
    assert_eq!(config.relay.ready_timeout_secs, 120);
    assert_eq!(config.tab.chain_id, 1);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = read_config(&path).unwrap_err();
    assert!(matches!(err, wcbridge_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_keeps_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[relay]
ping_interval_ms = 1
"#,
    )
    .unwrap();

    let config = read_config(&path).unwrap();
    assert_eq!(config.relay.ping_interval_ms, 1);
}

#[test]
fn load_logging_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"DEBUG\"\n").unwrap();

    let config = read_config(&path).unwrap();
    assert_eq!(config.logging.level, crate::schema::LogLevel::Debug);
    assert_eq!(config.logging.directive(), "wcbridge=debug");
}

#[test]
fn seed_and_read_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wcbridge").join("config.toml");

    seed_config(&path).unwrap();
    assert!(path.exists());

    let config = read_config(&path).unwrap();
    assert_eq!(config.channel.name, "walletconnect");
    assert_eq!(config.relay.ping_interval_ms, 1000);
}

#[test]
fn default_config_toml_is_valid() {

    let config: BridgeConfig = toml::from_str(&default_config_toml()).unwrap();
    assert_eq!(config.tab.bridge_url, "https://bridge.walletconnect.org");
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn read_or_seed_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = read_or_seed(&path).unwrap();
    assert_eq!(config.relay.tab_name, "walletconnect-tab");
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, default_config_toml());

    std::fs::write(&path, "[tab]\nchain_id = 5\n").unwrap();
    assert_eq!(read_or_seed(&path).unwrap().tab.chain_id, 5);
}

#[test]
fn read_or_seed_keeps_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[relay\n").unwrap();

    let err = read_or_seed(&path).unwrap_err();
    assert!(matches!(err, wcbridge_common::ConfigError::ParseError(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[relay\n");
}

#[test]
fn default_config_path_is_reasonable() {
    // This may not work in all CI environments, but should work locally
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("wcbridge"));
        assert!(path_str.ends_with("config.toml"));
    }
}
