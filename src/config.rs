//! Configuration for the fanbell dispatcher.
//!
//! Credentials are captured once at startup and are immutable for the
//! process lifetime. Values come from an optional TOML file
//! (`~/.config/fanbell/config.toml`, or an explicit `--config` path)
//! with environment variables taking precedence, matching the variable
//! names the notifier backends are conventionally configured with.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Feishu incoming-webhook credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeishuConfig {
    pub webhook_url: Option<String>,
}

/// DingTalk robot webhook credentials. The signing secret is optional and
/// only enables signed URLs; its absence never disables the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DingtalkConfig {
    pub webhook_url: Option<String>,
    pub secret: Option<String>,
}

/// WeChat Work group-robot webhook credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WechatConfig {
    pub webhook_url: Option<String>,
}

/// Telegram bot credentials. Both token and chat id are required for the
/// platform to count as configured. `api_base` exists so tests can point
/// the adapter at a stub server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
}

impl TelegramConfig {
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_TELEGRAM_API_BASE)
    }
}

/// Full application configuration, one section per platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feishu: FeishuConfig,
    #[serde(default)]
    pub dingtalk: DingtalkConfig,
    #[serde(default)]
    pub wechat: WechatConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Config {
    /// Load configuration for the process: the TOML file if one exists,
    /// then environment overrides on top.
    ///
    /// An explicit path must exist and parse; the default location is
    /// optional and silently skipped when absent.
    pub fn load(explicit_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::ConfigNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Build configuration from environment variables alone.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_from(|key| std::env::var(key).ok());
        config
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config_with_source("Failed to read config file", e))?;
        toml::from_str(&content)
            .map_err(|e| AppError::config_with_source("Failed to parse config file", e))
    }

    /// Default location: `~/.config/fanbell/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        let base_dirs = BaseDirs::new()?;
        Some(
            base_dirs
                .home_dir()
                .join(".config")
                .join("fanbell")
                .join("config.toml"),
        )
    }

    /// Apply environment-style overrides through an injectable lookup,
    /// so tests can supply synthetic variables without touching the
    /// process environment. Empty values are treated as unset.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| get(key).filter(|v| !v.is_empty());

        if let Some(url) = lookup("FEISHU_WEBHOOK_URL") {
            self.feishu.webhook_url = Some(url);
        }
        if let Some(url) = lookup("DINGTALK_WEBHOOK_URL") {
            self.dingtalk.webhook_url = Some(url);
        }
        if let Some(secret) = lookup("DINGTALK_SECRET") {
            self.dingtalk.secret = Some(secret);
        }
        if let Some(url) = lookup("WECHAT_WEBHOOK_URL") {
            self.wechat.webhook_url = Some(url);
        }
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(base) = lookup("TELEGRAM_API_BASE") {
            self.telegram.api_base = Some(base);
        }
    }
}
