use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::{ControllerSettings, DEFAULT_DEBOUNCE};
use crate::history_store::DEFAULT_HISTORY_LIMIT;
use crate::session::DEFAULT_FETCH_TIMEOUT;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid JSON5 config: {0}")]
    Json5(#[from] json5::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_url: String,
    pub debounce_ms: u64,
    pub fetch_timeout_ms: u64,
    pub max_results: u16,
    pub history_limit: usize,
    pub role: Option<String>,
    pub placeholder: String,
    pub show_filters: bool,
    pub show_suggestions: bool,
    pub show_history: bool,
    pub query_dsl_enabled: bool,
    pub history_db_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT.as_millis() as u64,
            max_results: 20,
            history_limit: DEFAULT_HISTORY_LIMIT,
            role: None,
            placeholder: "Search courses, teachers, rooms...".to_string(),
            show_filters: true,
            show_suggestions: true,
            show_history: true,
            query_dsl_enabled: true,
            history_db_path: base.join("history.sqlite3"),
            config_path: base.join("config.toml"),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: self.debounce(),
            max_results: usize::from(self.max_results),
            role: self.role.clone().filter(|role| !role.trim().is_empty()),
            show_filters: self.show_filters,
            show_suggestions: self.show_suggestions,
            show_history: self.show_history,
            query_dsl_enabled: self.query_dsl_enabled,
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("campusfind")
}

pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut cfg = match std::fs::read_to_string(&config_path) {
        Ok(text) => parse(&text, &config_path)?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(error) => return Err(error.into()),
    };
    cfg.config_path = config_path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = if is_json5(&cfg.config_path) {
        serde_json::to_string_pretty(cfg).map_err(|error| ConfigError::Invalid(error.to_string()))?
    } else {
        toml::to_string_pretty(cfg)?
    };
    std::fs::write(&cfg.config_path, text)?;
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(5..=100).contains(&cfg.max_results) {
        return Err(ConfigError::Invalid(
            "max_results must be between 5 and 100".into(),
        ));
    }
    if !(1..=100).contains(&cfg.history_limit) {
        return Err(ConfigError::Invalid(
            "history_limit must be between 1 and 100".into(),
        ));
    }
    if cfg.debounce_ms > 5_000 {
        return Err(ConfigError::Invalid(
            "debounce_ms must be at most 5000".into(),
        ));
    }
    if !(100..=120_000).contains(&cfg.fetch_timeout_ms) {
        return Err(ConfigError::Invalid(
            "fetch_timeout_ms must be between 100 and 120000".into(),
        ));
    }
    let service_url = cfg.service_url.trim();
    if service_url.is_empty() {
        return Err(ConfigError::Invalid("service_url is required".into()));
    }
    if !service_url.starts_with("http://") && !service_url.starts_with("https://") {
        return Err(ConfigError::Invalid(
            "service_url must start with http:// or https://".into(),
        ));
    }
    if cfg.history_db_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("history_db_path is required".into()));
    }
    if cfg.config_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("config_path is required".into()));
    }
    Ok(())
}

fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
    if is_json5(path) {
        Ok(json5::from_str(text)?)
    } else {
        Ok(toml::from_str(text)?)
    }
}

fn is_json5(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5") || ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
