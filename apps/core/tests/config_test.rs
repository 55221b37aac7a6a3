use std::time::Duration;

use campusfind_core::config::{self, Config, ConfigError};

#[test]
fn rejects_max_results_out_of_range() {
    let cfg = Config {
        max_results: 200,
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.max_results, 20);
    assert_eq!(cfg.debounce(), Duration::from_millis(300));
    assert!(cfg.history_db_path.to_string_lossy().contains("campusfind"));
    assert!(cfg.config_path.to_string_lossy().contains("campusfind"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_non_http_service_url() {
    let cfg = Config {
        service_url: "ftp://campus.local".into(),
        ..Default::default()
    };
    let error = config::validate(&cfg).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(_)));
}

#[test]
fn rejects_zero_history_limit_and_tiny_timeout() {
    let no_history = Config {
        history_limit: 0,
        ..Default::default()
    };
    let tiny_timeout = Config {
        fetch_timeout_ms: 10,
        ..Default::default()
    };
    assert!(config::validate(&no_history).is_err());
    assert!(config::validate(&tiny_timeout).is_err());
}

#[test]
fn missing_file_loads_defaults_at_that_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.service_url, config::DEFAULT_SERVICE_URL);
}

#[test]
fn loads_partial_toml_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "service_url = \"https://campus.example\"\ndebounce_ms = 150\nrole = \"teacher\"\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.service_url, "https://campus.example");
    assert_eq!(cfg.debounce_ms, 150);
    assert_eq!(cfg.role.as_deref(), Some("teacher"));
    assert_eq!(cfg.max_results, 20);
    assert!(cfg.show_history);
}

#[test]
fn loads_json5_with_comments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(
        &path,
        "{\n  // staging service\n  service_url: 'http://staging:9000',\n  max_results: 50,\n  show_filters: false,\n}\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.service_url, "http://staging:9000");
    assert_eq!(cfg.max_results, 50);
    assert!(!cfg.controller_settings().show_filters);
}

#[test]
fn invalid_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "max_results = \"many\"\n").unwrap();

    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Toml(_))));
}

#[test]
fn out_of_range_file_value_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "max_results = 2\n").unwrap();

    assert!(matches!(config::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        config_path: dir.path().join("sub").join("config.toml"),
        role: Some("admin".into()),
        history_limit: 25,
        ..Default::default()
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(&cfg.config_path)).unwrap();

    assert_eq!(loaded, cfg);
}
