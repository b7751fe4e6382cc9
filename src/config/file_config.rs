//! Configuration file support.
//!
//! # Configuration File Format
//!
//! ```toml
//! [telegram]
//! bot_token = "123456:ABC-DEF"
//! cache_time_secs = 300
//!
//! [pixiv]
//! refresh_token = "your-refresh-token"
//! client_id = "your-client-id"
//! client_secret = "your-client-secret"
//! reverse_proxy_url = "https://i.pixiv.re/"
//!
//! [http]
//! timeout_secs = 30
//! probe_timeout_secs = 5
//! ```
//!
//! Every key may be overridden through the environment, for example
//! `PIXIV_INLINE_PIXIV__REVERSE_PROXY_URL`.

use std::path::{Path, PathBuf};

use super::{Config, HttpConfig, PixivConfig, TelegramConfig};
use crate::inline::DEFAULT_CACHE_TIME;
use crate::pixiv::{APP_API_BASE_URL, OAUTH_BASE_URL};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pixiv-inline.toml";

/// Locate a configuration file.
///
/// Checks `./pixiv-inline.toml`, then `<config dir>/pixiv-inline/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}

/// Per-user configuration path, e.g. `~/.config/pixiv-inline/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pixiv-inline").join("config.toml"))
}

impl Config {
    /// Template written by `--init-config`, with secrets left blank
    pub fn template() -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: String::new(),
                cache_time_secs: DEFAULT_CACHE_TIME,
            },
            pixiv: PixivConfig {
                refresh_token: String::new(),
                client_id: String::new(),
                client_secret: String::new(),
                reverse_proxy_url: None,
                oauth_base_url: OAUTH_BASE_URL.to_string(),
                api_base_url: APP_API_BASE_URL.to_string(),
            },
            http: HttpConfig::default(),
        }
    }

    /// Read back a file written by [`save_file`](Self::save_file), without
    /// environment overrides
    #[cfg(test)]
    pub fn load_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save_file(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Write the configuration template to `path`, refusing to overwrite
pub fn write_default_config(path: &Path) -> Result<(), ConfigFileError> {
    if path.exists() {
        return Err(ConfigFileError::AlreadyExists(path.display().to_string()));
    }

    Config::template().save_file(path)
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0}")]
    AlreadyExists(String),
}
