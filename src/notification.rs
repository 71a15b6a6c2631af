//! Core notification value types shared by the dispatcher and all adapters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Severity level of a notification.
///
/// The level only affects presentation: each adapter maps it to a glyph
/// and, where the backend supports styling, a color template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// Glyph prepended to the rendered title.
    pub fn emoji(self) -> &'static str {
        match self {
            Level::Info => "ℹ️",
            Level::Success => "✅",
            Level::Warning => "⚠️",
            Level::Error => "❌",
        }
    }

    /// Feishu card header color template for this level.
    pub fn card_template(self) -> &'static str {
        match self {
            Level::Info => "blue",
            Level::Success => "green",
            Level::Warning => "orange",
            Level::Error => "red",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Level::Info),
            "success" => Ok(Level::Success),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(AppError::InvalidLevel {
                value: other.to_string(),
            }),
        }
    }
}

/// Identifier of one chat backend the dispatcher knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Feishu,
    Dingtalk,
    Wechat,
    Telegram,
}

impl Platform {
    /// The full fixed set of backends, in canonical dispatch order.
    /// The `"all"` wildcard selector expands to exactly this list.
    pub const ALL: [Platform; 4] = [
        Platform::Feishu,
        Platform::Dingtalk,
        Platform::Wechat,
        Platform::Telegram,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Feishu => "feishu",
            Platform::Dingtalk => "dingtalk",
            Platform::Wechat => "wechat",
            Platform::Telegram => "telegram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feishu" => Ok(Platform::Feishu),
            "dingtalk" => Ok(Platform::Dingtalk),
            "wechat" => Ok(Platform::Wechat),
            "telegram" => Ok(Platform::Telegram),
            other => Err(AppError::UnknownPlatform {
                name: other.to_string(),
            }),
        }
    }
}

/// One logical notification event, rendered per-platform by the adapters.
///
/// The value is immutable once constructed. `metadata` is an ordered list
/// of key/value pairs used for display only; adapters flatten it into
/// `key: value` lines in their own markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Notification {
            title: None,
            message: message.into(),
            level: Level::default(),
            metadata: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<(String, String)>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Checks the contract invariants. An empty message is a caller bug
    /// and is the only condition the dispatcher propagates as a hard error.
    pub fn validate(&self) -> AppResult<()> {
        if self.message.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }
        Ok(())
    }
}
