//! Telegram bot-API adapter.
//!
//! Telegram parses the message as strict Markdown, so every piece of
//! user-supplied text is escaped before embedding. The bot token is part
//! of the URL path; the API base is overridable so tests can target a
//! stub server. Success is `ok == true`, and Telegram is the one backend
//! that returns a message identifier on success.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{build_http_client, send_time_string, Notifier};
use crate::config::TelegramConfig;
use crate::errors::AppResult;
use crate::notification::{Notification, Platform};
use crate::outcome::DeliveryOutcome;

/// Characters Telegram's Markdown mode requires escaping.
const MARKDOWN_SPECIALS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
    result: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
}

/// Backslash-escape Telegram Markdown special characters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> AppResult<Self> {
        Ok(TelegramNotifier {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: config.api_base().trim_end_matches('/').to_string(),
            client: build_http_client("telegram")?,
        })
    }

    fn build_text(notification: &Notification) -> String {
        let title = notification.title.as_deref().unwrap_or("Notification");
        let mut text = format!(
            "{} *{}*\n\n{}",
            notification.level.emoji(),
            escape_markdown(title),
            escape_markdown(&notification.message)
        );

        if !notification.metadata.is_empty() {
            text.push_str("\n\n*Metadata*:\n");
            let lines: Vec<String> = notification
                .metadata
                .iter()
                .map(|(key, value)| {
                    format!("• *{}*: {}", escape_markdown(key), escape_markdown(value))
                })
                .collect();
            text.push_str(&lines.join("\n"));
        }

        text.push_str(&format!(
            "\n\n_🕐 {}_",
            escape_markdown(&send_time_string())
        ));
        text
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    /// Both the bot token and the chat id are required.
    fn is_configured(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.chat_id.as_deref().is_some_and(|c| !c.is_empty())
    }

    async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let (Some(token), Some(chat_id)) = (
            self.bot_token.as_deref().filter(|t| !t.is_empty()),
            self.chat_id.as_deref().filter(|c| !c.is_empty()),
        ) else {
            return DeliveryOutcome::failed(
                Platform::Telegram,
                "Telegram bot token or chat ID not configured",
            );
        };

        let url = format!("{}/bot{token}/sendMessage", self.api_base);
        let payload = json!({
            "chat_id": chat_id,
            "text": Self::build_text(notification),
            "parse_mode": "Markdown"
        });
        debug!(platform = "telegram", "sending bot message");

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "telegram", error = %e, "delivery failed");
                return DeliveryOutcome::failed(Platform::Telegram, e.to_string());
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "telegram", error = %e, "backend returned error status");
                return DeliveryOutcome::failed(Platform::Telegram, e.to_string());
            }
        };

        match response.json::<TelegramResponse>().await {
            Ok(TelegramResponse {
                ok: true, result, ..
            }) => match result {
                Some(message) => DeliveryOutcome::ok_with_id(
                    Platform::Telegram,
                    message.message_id.to_string(),
                ),
                None => DeliveryOutcome::ok(Platform::Telegram),
            },
            Ok(body) => DeliveryOutcome::failed(
                Platform::Telegram,
                body.description
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            Err(_) => DeliveryOutcome::failed(Platform::Telegram, "Unknown error"),
        }
    }
}
