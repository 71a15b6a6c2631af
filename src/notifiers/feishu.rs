//! Feishu (Lark) custom-bot adapter.
//!
//! Renders an interactive card with a colored header keyed by the
//! notification level. Feishu signals success with `code == 0`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{build_http_client, send_time_string, Notifier};
use crate::config::FeishuConfig;
use crate::errors::AppResult;
use crate::notification::{Notification, Platform};
use crate::outcome::DeliveryOutcome;

pub struct FeishuNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FeishuResponse {
    code: Option<i64>,
    msg: Option<String>,
}

impl FeishuNotifier {
    pub fn new(config: &FeishuConfig) -> AppResult<Self> {
        Ok(FeishuNotifier {
            webhook_url: config.webhook_url.clone(),
            client: build_http_client("feishu")?,
        })
    }

    fn build_card(notification: &Notification) -> Value {
        let title = format!(
            "{} {}",
            notification.level.emoji(),
            notification.title.as_deref().unwrap_or("通知")
        );

        let mut elements = vec![json!({
            "tag": "div",
            "text": { "tag": "lark_md", "content": notification.message }
        })];

        if !notification.metadata.is_empty() {
            let lines: Vec<String> = notification
                .metadata
                .iter()
                .map(|(key, value)| format!("- **{key}**: {value}"))
                .collect();
            elements.push(json!({ "tag": "hr" }));
            elements.push(json!({
                "tag": "div",
                "text": {
                    "tag": "lark_md",
                    "content": format!("**Metadata**:\n{}", lines.join("\n"))
                }
            }));
        }

        elements.push(json!({
            "tag": "note",
            "elements": [
                { "tag": "plain_text", "content": format!("发送时间: {}", send_time_string()) }
            ]
        }));

        json!({
            "msg_type": "interactive",
            "card": {
                "header": {
                    "title": { "tag": "plain_text", "content": title },
                    "template": notification.level.card_template()
                },
                "elements": elements
            }
        })
    }
}

#[async_trait]
impl Notifier for FeishuNotifier {
    fn platform(&self) -> Platform {
        Platform::Feishu
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let Some(url) = self.webhook_url.as_deref().filter(|u| !u.is_empty()) else {
            return DeliveryOutcome::failed(
                Platform::Feishu,
                "Feishu webhook URL not configured",
            );
        };

        let payload = Self::build_card(notification);
        debug!(platform = "feishu", "sending notification card");

        let response = match self.client.post(url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "feishu", error = %e, "delivery failed");
                return DeliveryOutcome::failed(Platform::Feishu, e.to_string());
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "feishu", error = %e, "backend returned error status");
                return DeliveryOutcome::failed(Platform::Feishu, e.to_string());
            }
        };

        match response.json::<FeishuResponse>().await {
            Ok(FeishuResponse { code: Some(0), .. }) => DeliveryOutcome::ok(Platform::Feishu),
            Ok(body) => DeliveryOutcome::failed(
                Platform::Feishu,
                body.msg.unwrap_or_else(|| "Unknown error".to_string()),
            ),
            Err(_) => DeliveryOutcome::failed(Platform::Feishu, "Unknown error"),
        }
    }
}
