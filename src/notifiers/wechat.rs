//! WeChat Work (企业微信) group-robot adapter.
//!
//! Renders a markdown message using WeChat's `<font color>` markup for
//! metadata and the timestamp footer. Success is `errcode == 0`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{build_http_client, send_time_string, Notifier};
use crate::config::WechatConfig;
use crate::errors::AppResult;
use crate::notification::{Notification, Platform};
use crate::outcome::DeliveryOutcome;

pub struct WechatNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WechatResponse {
    errcode: Option<i64>,
    errmsg: Option<String>,
}

impl WechatNotifier {
    pub fn new(config: &WechatConfig) -> AppResult<Self> {
        Ok(WechatNotifier {
            webhook_url: config.webhook_url.clone(),
            client: build_http_client("wechat")?,
        })
    }

    fn build_payload(notification: &Notification) -> Value {
        let mut content = format!(
            "### {} {}\n\n{}",
            notification.level.emoji(),
            notification.title.as_deref().unwrap_or("通知"),
            notification.message
        );

        if !notification.metadata.is_empty() {
            content.push_str("\n\n---\n**Metadata**:\n");
            let lines: Vec<String> = notification
                .metadata
                .iter()
                .map(|(key, value)| format!("> {key}: <font color=\"info\">{value}</font>"))
                .collect();
            content.push_str(&lines.join("\n"));
        }

        content.push_str(&format!(
            "\n\n---\n<font color=\"comment\">🕐 {}</font>",
            send_time_string()
        ));

        json!({
            "msgtype": "markdown",
            "markdown": { "content": content }
        })
    }
}

#[async_trait]
impl Notifier for WechatNotifier {
    fn platform(&self) -> Platform {
        Platform::Wechat
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let Some(url) = self.webhook_url.as_deref().filter(|u| !u.is_empty()) else {
            return DeliveryOutcome::failed(
                Platform::Wechat,
                "WeChat webhook URL not configured",
            );
        };

        let payload = Self::build_payload(notification);
        debug!(platform = "wechat", "sending markdown notification");

        let response = match self.client.post(url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "wechat", error = %e, "delivery failed");
                return DeliveryOutcome::failed(Platform::Wechat, e.to_string());
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "wechat", error = %e, "backend returned error status");
                return DeliveryOutcome::failed(Platform::Wechat, e.to_string());
            }
        };

        match response.json::<WechatResponse>().await {
            Ok(WechatResponse {
                errcode: Some(0), ..
            }) => DeliveryOutcome::ok(Platform::Wechat),
            Ok(body) => DeliveryOutcome::failed(
                Platform::Wechat,
                body.errmsg.unwrap_or_else(|| "Unknown error".to_string()),
            ),
            Err(_) => DeliveryOutcome::failed(Platform::Wechat, "Unknown error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Level;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier_for(url: Option<String>) -> WechatNotifier {
        WechatNotifier::new(&WechatConfig { webhook_url: url }).unwrap()
    }

    #[test]
    fn gate_requires_webhook_url() {
        assert!(!notifier_for(None).is_configured());
        assert!(notifier_for(Some("https://qyapi.example/hook".into())).is_configured());
    }

    #[test]
    fn payload_uses_font_markup_for_metadata() {
        let notification = Notification::new("disk usage at 91%")
            .with_level(Level::Warning)
            .with_metadata(vec![("host".into(), "db-1".into())]);
        let payload = WechatNotifier::build_payload(&notification);
        let content = payload["markdown"]["content"].as_str().unwrap();
        assert!(content.starts_with("### ⚠️ 通知"));
        assert!(content.contains("> host: <font color=\"info\">db-1</font>"));
        assert!(content.contains("<font color=\"comment\">🕐 "));
    }

    #[tokio::test]
    async fn unconfigured_send_short_circuits() {
        let outcome = notifier_for(None).send(&Notification::new("hi")).await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("WeChat webhook URL not configured")
        );
    }

    #[tokio::test]
    async fn successful_send_parses_errcode_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "errcode": 0, "errmsg": "ok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notifier = notifier_for(Some(server.uri()));
        let outcome = notifier.send(&Notification::new("hi")).await;
        assert!(outcome.success);
        assert!(outcome.delivery_id.is_none());
    }
}
