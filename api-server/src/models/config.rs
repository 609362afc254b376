use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use getset::Getters;
use log::LevelFilter;
use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use std::path::Path;
use thiserror::Error;
use utils::query_url::with_query;

/// Environment variable pointing at an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "MOVIE_PROXY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_KEYS: &[&str] = &[
    "api_url",
    "api_key",
    "port",
    "address",
    "upstream_timeout_secs",
    "log_level",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}; create a .env file with API_URL and API_KEY")]
    Missing(&'static str),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("failed to read configuration: {0}")]
    Figment(#[from] figment::Error),
}

#[serde_inline_default]
#[derive(Debug, Clone, Deserialize, Getters)]
#[get = "pub"]
pub struct Config {
    /// Base URL of the upstream movie provider.
    #[serde(default)]
    api_url: String,
    /// Credential sent to the provider with every request.
    #[serde(default)]
    api_key: String,
    #[serde_inline_default(DEFAULT_PORT)]
    port: u16,
    #[serde_inline_default(DEFAULT_ADDRESS.to_string())]
    address: String,
    #[serde_inline_default(DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    upstream_timeout_secs: u64,
    #[serde_inline_default(DEFAULT_LOG_LEVEL.to_string())]
    log_level: String,
}

impl Config {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            port: DEFAULT_PORT,
            address: DEFAULT_ADDRESS.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// YAML file at `path` (if present) overridden by the process environment.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::raw().only(ENV_KEYS))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration the server starts with.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_figment(&Self::figment(path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("API_URL"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("API_KEY"));
        }
        with_query(&self.api_url, &[]).map_err(|e| ConfigError::Invalid {
            name: "API_URL",
            reason: e.to_string(),
        })?;
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|e| ConfigError::Invalid {
                name: "LOG_LEVEL",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn from_yaml(contents: &str) -> Result<Config, ConfigError> {
        let dir = TempDir::new("movie-proxy-config").unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, contents).unwrap();
        Config::from_figment(&Figment::new().merge(Yaml::file(&path)))
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_yaml("api_url: http://www.omdbapi.com\napi_key: abc123\n").unwrap();
        assert_eq!(config.api_url(), "http://www.omdbapi.com");
        assert_eq!(*config.port(), DEFAULT_PORT);
        assert_eq!(*config.upstream_timeout_secs(), DEFAULT_UPSTREAM_TIMEOUT_SECS);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let config = from_yaml(
            "api_url: http://localhost:9999\napi_key: k\nport: 3001\nlog_level: debug\n",
        )
        .unwrap();
        assert_eq!(*config.port(), 3001);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = from_yaml("api_url: http://www.omdbapi.com\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn test_blank_api_url_is_fatal() {
        let err = from_yaml("api_url: '  '\napi_key: k\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_URL")));
    }

    #[test]
    fn test_malformed_api_url() {
        let err = from_yaml("api_url: omdb\napi_key: k\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "API_URL", .. }));
    }

    #[test]
    fn test_unknown_log_level() {
        let err = from_yaml("api_url: http://x.test\napi_key: k\nlog_level: loud\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LOG_LEVEL", .. }));
    }
}
