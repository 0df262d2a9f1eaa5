//! Gateway configuration
//!
//! Read once at startup from the process environment (after `.env` is
//! loaded). Missing required keys fail fast: the binary logs the error and
//! exits non-zero before binding the port or touching Telegram.

use std::path::PathBuf;
use std::time::Duration;

use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;
use thiserror::Error;

/// Environment keys read by the gateway
const ENV_KEYS: &[&str] = &[
    "TELEGRAM_TOKEN",
    "TELEGRAM_APP_URL",
    "BUCKET_NAME",
    "YOLO5_SERVICE_URL",
    "PORT",
    "DOWNLOAD_DIR",
    "HTTP_TIMEOUT_SECS",
    "BOT_API_URL",
    "LOG_FILE_PATH",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("{key} is not a valid URL: {source}")]
    Url {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    pub telegram_token: String,
    /// Public base URL Telegram posts updates to
    pub telegram_app_url: String,
    pub bucket_name: String,
    pub yolo5_service_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Custom Bot API server (local telegram-bot-api)
    #[serde(default)]
    pub bot_api_url: Option<String>,
    #[serde(default = "default_log_file_path")]
    pub log_file_path: String,
}

fn default_port() -> u16 {
    8443
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("photos")
}

fn default_http_timeout_secs() -> u64 {
    120
}

fn default_log_file_path() -> String {
    "polybot.log".to_string()
}

impl GatewayConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Env::raw().only(ENV_KEYS)))
    }

    /// Extracts and validates configuration from any figment
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: GatewayConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.telegram_app_url).map_err(|source| ConfigError::Url {
            key: "TELEGRAM_APP_URL",
            source,
        })?;
        url::Url::parse(&self.yolo5_service_url).map_err(|source| ConfigError::Url {
            key: "YOLO5_SERVICE_URL",
            source,
        })?;
        if let Some(ref api) = self.bot_api_url {
            url::Url::parse(api).map_err(|source| ConfigError::Url {
                key: "BOT_API_URL",
                source,
            })?;
        }
        Ok(())
    }

    /// Full webhook URL registered with Telegram: `{app_url}/{token}/`
    pub fn webhook_url(&self) -> Result<url::Url, ConfigError> {
        let raw = format!("{}/{}/", self.telegram_app_url.trim_end_matches('/'), self.telegram_token);
        url::Url::parse(&raw).map_err(|source| ConfigError::Url {
            key: "TELEGRAM_APP_URL",
            source,
        })
    }

    /// Path the webhook route is mounted on
    pub fn webhook_path(&self) -> String {
        format!("/{}/", self.telegram_token)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Non-secret settings for the startup banner
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("app url", self.telegram_app_url.clone()),
            ("bucket", self.bucket_name.clone()),
            ("yolo5 service", self.yolo5_service_url.clone()),
            ("port", self.port.to_string()),
            ("download dir", self.download_dir.display().to_string()),
        ]
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("telegram_token", &"<redacted>")
            .field("telegram_app_url", &self.telegram_app_url)
            .field("bucket_name", &self.bucket_name)
            .field("yolo5_service_url", &self.yolo5_service_url)
            .field("port", &self.port)
            .field("download_dir", &self.download_dir)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("bot_api_url", &self.bot_api_url)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn required() -> Figment {
        Figment::new()
            .merge(("telegram_token", "123:abc"))
            .merge(("telegram_app_url", "https://bot.example.com/"))
            .merge(("bucket_name", "images"))
            .merge(("yolo5_service_url", "http://yolo5:8081"))
    }

    #[test]
    fn test_defaults_applied() {
        let config = GatewayConfig::from_figment(required()).unwrap();
        assert_eq!(config.port, 8443);
        assert_eq!(config.download_dir, PathBuf::from("photos"));
        assert_eq!(config.http_timeout(), Duration::from_secs(120));
        assert!(config.bot_api_url.is_none());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let figment = Figment::new()
            .merge(("telegram_token", "123:abc"))
            .merge(("telegram_app_url", "https://bot.example.com"));
        let err = GatewayConfig::from_figment(figment).unwrap_err();
        assert!(err.to_string().contains("bucket_name"), "unexpected error: {}", err);
    }

    #[test]
    fn test_invalid_service_url_fails() {
        let figment = required().merge(("yolo5_service_url", "not a url"));
        let err = GatewayConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, ConfigError::Url { key: "YOLO5_SERVICE_URL", .. }));
    }

    #[test]
    fn test_webhook_url_and_path() {
        let config = GatewayConfig::from_figment(required()).unwrap();
        assert_eq!(config.webhook_url().unwrap().as_str(), "https://bot.example.com/123:abc/");
        assert_eq!(config.webhook_path(), "/123:abc/");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GatewayConfig::from_figment(required()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("123:abc"));
        assert!(debug.contains("<redacted>"));
    }
}
