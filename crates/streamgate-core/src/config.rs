//! Configuration module
//!
//! Runtime configuration for the streamgate API, loaded once from the
//! environment and shared read-only behind an `Arc`.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 2024;
const CALLBACK_TIMEOUT_SECS: u64 = 30;
const TOKEN_TTL_HOURS: i64 = 24 * 365;
/// Upper bound for `TOKEN_TTL_HOURS` (ten years).
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;
const RECORD_DIR: &str = "./record";
const VOICES_DIR: &str = "./containers/conf";

/// Log output format for the fmt layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Shared API secret. Empty means every authenticated call is refused.
    pub api_secret: String,
    /// Password accepted by the login endpoint; `None` disables login.
    pub mgmt_password: Option<String>,
    pub record_dir: PathBuf,
    pub voices_dir: PathBuf,
    pub callback_timeout_secs: u64,
    pub token_ttl_hours: i64,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            api_secret: String::new(),
            mgmt_password: None,
            record_dir: PathBuf::from(RECORD_DIR),
            voices_dir: PathBuf::from(VOICES_DIR),
            callback_timeout_secs: CALLBACK_TIMEOUT_SECS,
            token_ttl_hours: TOKEN_TTL_HOURS,
            log_format: LogFormat::Text,
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_port", &self.server_port)
            .field("environment", &self.environment)
            .field(
                "api_secret",
                &if self.api_secret.is_empty() {
                    "<empty>"
                } else {
                    "<redacted>"
                },
            )
            .field(
                "mgmt_password",
                &self.mgmt_password.as_ref().map(|_| "<redacted>"),
            )
            .field("record_dir", &self.record_dir)
            .field("voices_dir", &self.voices_dir)
            .field("callback_timeout_secs", &self.callback_timeout_secs)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. `from_env` passes
    /// the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_else(|| "text".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            api_secret: lookup("API_SECRET").unwrap_or_default(),
            mgmt_password: lookup("MGMT_PASSWORD").filter(|p| !p.is_empty()),
            record_dir: lookup("RECORD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(RECORD_DIR)),
            voices_dir: lookup("VOICES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(VOICES_DIR)),
            callback_timeout_secs: lookup("CALLBACK_TIMEOUT_SECS")
                .unwrap_or_else(|| CALLBACK_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CALLBACK_TIMEOUT_SECS must be a valid number"))?,
            token_ttl_hours: lookup("TOKEN_TTL_HOURS")
                .unwrap_or_else(|| TOKEN_TTL_HOURS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("TOKEN_TTL_HOURS must be a valid number"))?,
            log_format,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.api_secret.is_empty() {
            return Err(anyhow::anyhow!(
                "API_SECRET must be set in production; every authenticated request would be refused"
            ));
        }
        if self.callback_timeout_secs == 0 {
            return Err(anyhow::anyhow!("CALLBACK_TIMEOUT_SECS must be greater than zero"));
        }
        if self.token_ttl_hours <= 0 {
            return Err(anyhow::anyhow!("TOKEN_TTL_HOURS must be greater than zero"));
        }
        if self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(anyhow::anyhow!(
                "TOKEN_TTL_HOURS must be at most {}",
                MAX_TOKEN_TTL_HOURS
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }

    /// Lifetime of issued tokens; `None` when the hour count does not fit a duration.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.token_ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server_port, 2024);
        assert_eq!(config.environment, "development");
        assert!(config.api_secret.is_empty());
        assert!(config.mgmt_password.is_none());
        assert_eq!(config.record_dir, PathBuf::from("./record"));
        assert_eq!(config.callback_timeout(), Duration::from_secs(30));
        assert_eq!(config.token_ttl(), Some(chrono::Duration::days(365)));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("APP_ENV", "prod"),
            ("API_SECRET", "s3cret"),
            ("MGMT_PASSWORD", "hunter2"),
            ("RECORD_DIR", "/data/record"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert!(config.is_production());
        assert_eq!(config.api_secret, "s3cret");
        assert_eq!(config.mgmt_password.as_deref(), Some("hunter2"));
        assert_eq!(config.record_dir, PathBuf::from("/data/record"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port_is_error() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = Config::from_lookup(lookup_from(&[("ENVIRONMENT", "production")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_ttl_bounds() {
        for hours in [0, -1, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            let config = Config {
                token_ttl_hours: hours,
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{hours}");
        }

        let config = Config {
            token_ttl_hours: MAX_TOKEN_TTL_HOURS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.token_ttl().is_some());

        let config = Config {
            token_ttl_hours: i64::MAX,
            ..Config::default()
        };
        assert_eq!(config.token_ttl(), None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            callback_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            api_secret: "topsecret".to_string(),
            mgmt_password: Some("hunter2".to_string()),
            ..Config::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
