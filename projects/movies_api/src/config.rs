use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use interfaces_tmdb_movies::index::DEFAULT_BASE_URL;
use thiserror::Error;
use utils_trace::LogFormat;

/// Runtime configuration shared by the server and the batch jobs.
///
/// | Env Var                   | Default                        |
/// |---------------------------|--------------------------------|
/// | `HOST`                    | `0.0.0.0`                      |
/// | `PORT`                    | `3000`                         |
/// | `MONGODB_URI`             | `mongodb://127.0.0.1:27017`    |
/// | `MONGODB_DB`              | `movies`                       |
/// | `API_BEARER_TOKEN`        | required by the server         |
/// | `ALLOWED_ORIGINS`         | any origin                     |
/// | `TRUSTED_PROXIES`         | none                           |
/// | `RATE_LIMIT_WINDOW_MS`    | `60000`                        |
/// | `RATE_LIMIT_MAX_REQUESTS` | `100`                          |
/// | `BODY_LIMIT_BYTES`        | `10485760`                     |
/// | `LOG_LEVEL`               | `info`                         |
/// | `LOG_FORMAT`              | `compact`                      |
/// | `TMDB_API_KEY`            | required by jobs and providers |
/// | `TMDB_BASE_URL`           | `https://api.themoviedb.org/3` |
/// | `BATCH_SIZE`              | `100`                          |
/// | `MAX_PAGES`               | `1000`                         |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub api_bearer_token: Option<String>,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Peers allowed to set `X-Forwarded-For`.
    pub trusted_proxies: Vec<IpAddr>,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
    pub body_limit_bytes: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub batch_size: usize,
    pub max_pages: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("InvalidNumber: {key}={value}: {message}")]
    InvalidNumber {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("InvalidAddress: {key}={value}: {source}")]
    InvalidAddress {
        key: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("InvalidLogFormat: {source}")]
    InvalidLogFormat {
        #[from]
        source: utils_trace::ParseLogFormatError,
    },

    #[error("MissingVar: {key} must be set")]
    MissingVar { key: &'static str },
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let text = |key: &str, default: &str| -> String {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let optional = |key: &str| -> Option<String> {
            vars.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let allowed_origins = optional("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty() && origin != "*")
                    .collect()
            })
            .unwrap_or_default();

        let trusted_proxies = optional("TRUSTED_PROXIES")
            .map(|proxies| parse_addresses("TRUSTED_PROXIES", &proxies))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            host: text("HOST", "0.0.0.0"),
            port: parse_number(vars, "PORT", 3000)?,
            mongodb_uri: text("MONGODB_URI", "mongodb://127.0.0.1:27017"),
            mongodb_db: text("MONGODB_DB", "movies"),
            api_bearer_token: optional("API_BEARER_TOKEN"),
            allowed_origins,
            trusted_proxies,
            rate_limit_window: Duration::from_millis(parse_number(vars, "RATE_LIMIT_WINDOW_MS", 60_000)?),
            rate_limit_max_requests: parse_number(vars, "RATE_LIMIT_MAX_REQUESTS", 100)?,
            body_limit_bytes: parse_number(vars, "BODY_LIMIT_BYTES", 10 * 1024 * 1024)?,
            log_level: text("LOG_LEVEL", "info"),
            log_format: text("LOG_FORMAT", "compact").parse()?,
            tmdb_api_key: optional("TMDB_API_KEY"),
            tmdb_base_url: text("TMDB_BASE_URL", DEFAULT_BASE_URL),
            batch_size: parse_number(vars, "BATCH_SIZE", 100)?,
            max_pages: parse_number(vars, "MAX_PAGES", 1000)?,
        })
    }

    pub fn require_bearer_token(&self) -> Result<&str, ConfigError> {
        self.api_bearer_token
            .as_deref()
            .ok_or(ConfigError::MissingVar { key: "API_BEARER_TOKEN" })
    }

    pub fn require_tmdb_api_key(&self) -> Result<&str, ConfigError> {
        self.tmdb_api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar { key: "TMDB_API_KEY" })
    }
}

fn parse_number<T>(vars: &HashMap<String, String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key).map(|value| value.trim()).filter(|value| !value.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
            message: err.to_string(),
        }),
    }
}

fn parse_addresses(key: &'static str, raw: &str) -> Result<Vec<IpAddr>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse().map_err(|source| ConfigError::InvalidAddress {
                key,
                value: value.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_to_empty_environment() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.mongodb_db, "movies");
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.body_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_pages, 1000);
        assert_eq!(config.tmdb_base_url, DEFAULT_BASE_URL);
        assert!(config.allowed_origins.is_empty());
        assert!(config.api_bearer_token.is_none());
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_vars(&vars(&[
            ("PORT", "8080"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("RATE_LIMIT_WINDOW_MS", "1500"),
            ("API_BEARER_TOKEN", "  secret "),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.rate_limit_window, Duration::from_millis(1500));
        assert_eq!(config.require_bearer_token().unwrap(), "secret");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn wildcard_origin_means_any() {
        let config = AppConfig::from_vars(&vars(&[("ALLOWED_ORIGINS", "*")])).unwrap();
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = AppConfig::from_vars(&vars(&[("MAX_PAGES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key: "MAX_PAGES", .. }));
    }

    #[test]
    fn missing_tmdb_key_is_reported() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();
        assert!(matches!(
            config.require_tmdb_api_key(),
            Err(ConfigError::MissingVar { key: "TMDB_API_KEY" })
        ));
    }

    #[test]
    fn trusted_proxies_are_parsed() {
        let config = AppConfig::from_vars(&vars(&[("TRUSTED_PROXIES", "10.0.0.1, ::1")])).unwrap();
        assert_eq!(
            config.trusted_proxies,
            vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse::<IpAddr>().unwrap()]
        );

        let err = AppConfig::from_vars(&vars(&[("TRUSTED_PROXIES", "proxy.local")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { key: "TRUSTED_PROXIES", .. }));
    }
}
