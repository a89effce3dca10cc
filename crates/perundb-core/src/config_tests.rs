//! Tests for `config` module.

use super::config::EngineConfig;
use super::element::ElementType;

#[test]
fn test_defaults_match_params_defaults() {
    let config = EngineConfig::default();
    let params = config.params();
    assert_eq!(params.max_degree, 32);
    assert_eq!(params.ef_search, 128);
    assert_eq!(params.ef_construction, 200);
    assert_eq!(config.index.element_type, ElementType::F32);
}

#[test]
fn test_from_file_parses_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("perundb.toml");
    std::fs::write(
        &path,
        "[index]\nmax_degree = 48\nef_search = 256\nelement_type = \"f16\"\n",
    )
    .unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.index.max_degree, 48);
    assert_eq!(config.index.ef_search, 256);
    // Unset keys keep their defaults.
    assert_eq!(config.index.ef_construction, 200);
    assert_eq!(config.index.element_type, ElementType::F16);
}

#[test]
fn test_from_file_missing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::from_file(dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_zero_degree_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("perundb.toml");
    std::fs::write(&path, "[index]\nmax_degree = 0\n").unwrap();

    let result = EngineConfig::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_validate_default_is_ok() {
    assert!(EngineConfig::default().validate().is_ok());
}
