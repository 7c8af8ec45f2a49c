use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.api.base_url, DEFAULT_TMDB_BASE_URL);
    assert_eq!(cfg.api.language, "ko-KR");
    assert_eq!(cfg.api.timeouts, ApiTimeouts { request_secs: 30, connect_secs: 10 });
    assert_eq!(cfg.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
    assert!(!cfg.validate_credentials);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("TMDB_BASE_URL", "http://127.0.0.1:9999/3/"),
        ("TMDB_LANGUAGE", "en-US"),
        ("TMDB_REQUEST_TIMEOUT_SECS", "42"),
        ("TMDB_CONNECT_TIMEOUT_SECS", " 7 "),
        ("CINEBOX_STORAGE_PATH", "/tmp/cinebox.json"),
        ("CINEBOX_VALIDATE_CREDENTIALS", "Yes"),
    ]))
    .unwrap();
    assert_eq!(cfg.api.base_url, "http://127.0.0.1:9999/3");
    assert_eq!(cfg.api.language, "en-US");
    assert_eq!(cfg.api.timeouts, ApiTimeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.storage_path, PathBuf::from("/tmp/cinebox.json"));
    assert!(cfg.validate_credentials);
}

#[test]
fn from_lookup_blank_storage_path_falls_back() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("CINEBOX_STORAGE_PATH", "  ")])).unwrap();
    assert_eq!(cfg.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
}

#[test]
fn from_lookup_rejects_bad_timeout() {
    let err = AppConfig::from_lookup(lookup_from(&[("TMDB_REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNumber { var: "TMDB_REQUEST_TIMEOUT_SECS", value: "soon".to_owned() }
    );
}

#[test]
fn from_lookup_rejects_bad_bool() {
    let err = AppConfig::from_lookup(lookup_from(&[("CINEBOX_VALIDATE_CREDENTIALS", "maybe")])).unwrap_err();
    assert!(err.to_string().contains("CINEBOX_VALIDATE_CREDENTIALS"));
}

#[test]
fn from_lookup_rejects_empty_base_url() {
    let err = AppConfig::from_lookup(lookup_from(&[("TMDB_BASE_URL", "/")])).unwrap_err();
    assert_eq!(err, ConfigError::Empty { var: "TMDB_BASE_URL" });
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " on "] {
        assert_eq!(parse_bool(raw), Some(true), "expected true for {raw:?}");
    }
    for raw in ["0", "False", "no", "off"] {
        assert_eq!(parse_bool(raw), Some(false), "expected false for {raw:?}");
    }
    assert_eq!(parse_bool(""), None);
    assert_eq!(parse_bool("maybe"), None);
}
