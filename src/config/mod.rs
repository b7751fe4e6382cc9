//! Configuration management.
//!
//! Settings come from, in increasing priority:
//!
//! 1. defaults, which read the flat variables `TELEGRAM_BOT_TOKEN`,
//!    `PIXIV_REFRESH_TOKEN`, `PIXIV_CLIENT_ID`, `PIXIV_CLIENT_SECRET` and
//!    `PIXIV_REVERSE_PROXY_URL`
//! 2. a TOML file (see [`file_config`])
//! 3. `PIXIV_INLINE_<SECTION>__<KEY>` environment variables
//! 4. command line flags

pub mod file_config;

pub use file_config::{
    default_config_path, find_config_file, write_default_config, ConfigFileError,
    LOCAL_CONFIG_FILE,
};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::inline::DEFAULT_CACHE_TIME;
use crate::pixiv::{APP_API_BASE_URL, OAUTH_BASE_URL};

/// Prefix of structured environment overrides
pub const ENV_PREFIX: &str = "PIXIV_INLINE";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// pixiv API credentials and endpoints
    #[serde(default)]
    pub pixiv: PixivConfig,

    /// HTTP timeouts
    #[serde(default)]
    pub http: HttpConfig,
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_bot_token")]
    pub bot_token: String,

    /// Seconds Telegram may cache an inline answer
    #[serde(default = "default_cache_time")]
    pub cache_time_secs: u32,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: default_bot_token(),
            cache_time_secs: default_cache_time(),
        }
    }
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

fn default_bot_token() -> String {
    env_or_empty("TELEGRAM_BOT_TOKEN")
}

fn default_cache_time() -> u32 {
    DEFAULT_CACHE_TIME
}

/// pixiv credentials and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixivConfig {
    #[serde(default = "default_refresh_token")]
    pub refresh_token: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_client_secret")]
    pub client_secret: String,

    /// Base URL substituted for `https://i.pximg.net/` in image URLs
    #[serde(default = "default_reverse_proxy_url")]
    pub reverse_proxy_url: Option<String>,

    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for PixivConfig {
    fn default() -> Self {
        Self {
            refresh_token: default_refresh_token(),
            client_id: default_client_id(),
            client_secret: default_client_secret(),
            reverse_proxy_url: default_reverse_proxy_url(),
            oauth_base_url: default_oauth_base_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_refresh_token() -> String {
    env_or_empty("PIXIV_REFRESH_TOKEN")
}

fn default_client_id() -> String {
    env_or_empty("PIXIV_CLIENT_ID")
}

fn default_client_secret() -> String {
    env_or_empty("PIXIV_CLIENT_SECRET")
}

fn default_reverse_proxy_url() -> Option<String> {
    std::env::var("PIXIV_REVERSE_PROXY_URL")
        .ok()
        .filter(|s| !s.is_empty())
}

fn default_oauth_base_url() -> String {
    OAUTH_BASE_URL.to_string()
}

fn default_api_base_url() -> String {
    APP_API_BASE_URL.to_string()
}

/// HTTP timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout of API requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout of one image probe in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

/// Problems that make a configuration unusable
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Config {
    /// Check that every required setting is present and well-formed
    pub fn validate(&self) -> Result<(), SettingsError> {
        let required = [
            ("telegram.bot_token", &self.telegram.bot_token),
            ("pixiv.refresh_token", &self.pixiv.refresh_token),
            ("pixiv.client_id", &self.pixiv.client_id),
            ("pixiv.client_secret", &self.pixiv.client_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SettingsError::Missing(name));
            }
        }

        let urls = [
            ("pixiv.reverse_proxy_url", self.pixiv.reverse_proxy_url.as_deref()),
            ("pixiv.oauth_base_url", Some(self.pixiv.oauth_base_url.as_str())),
            ("pixiv.api_base_url", Some(self.pixiv.api_base_url.as_str())),
        ];
        for (name, value) in urls {
            if let Some(value) = value {
                url::Url::parse(value)
                    .map_err(|e| SettingsError::InvalidUrl(name, format!("{} ({})", value, e)))?;
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(SettingsError::InvalidValue("http.timeout_secs", "0".to_string()));
        }
        if self.http.probe_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "http.probe_timeout_secs",
                "0".to_string(),
            ));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}
