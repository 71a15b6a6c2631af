//! DingTalk robot-webhook adapter.
//!
//! Renders a markdown message and, when a signing secret is configured,
//! authenticates the call by appending `timestamp` and `sign` query
//! parameters to the webhook URL. The signature is
//! `base64(HMAC-SHA256(key = secret, message = "{millis}\n{secret}"))`
//! over the same millisecond timestamp that goes into the query string.
//! DingTalk signals success with `errcode == 0`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use tracing::{debug, warn};

use super::{build_http_client, send_time_string, Notifier};
use crate::config::DingtalkConfig;
use crate::errors::AppResult;
use crate::notification::{Notification, Platform};
use crate::outcome::DeliveryOutcome;

type HmacSha256 = Hmac<Sha256>;

pub struct DingtalkNotifier {
    webhook_url: Option<String>,
    secret: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DingtalkResponse {
    errcode: Option<i64>,
    errmsg: Option<String>,
}

impl DingtalkNotifier {
    pub fn new(config: &DingtalkConfig) -> AppResult<Self> {
        Ok(DingtalkNotifier {
            webhook_url: config.webhook_url.clone(),
            // An empty secret in the config file means no signing.
            secret: config.secret.clone().filter(|s| !s.is_empty()),
            client: build_http_client("dingtalk")?,
        })
    }

    /// The URL to POST to: the raw webhook when no secret is configured,
    /// otherwise the webhook with signature query parameters appended.
    fn delivery_url(&self, webhook_url: &str) -> String {
        match self.secret.as_deref() {
            Some(secret) => Self::signed_url(webhook_url, secret, Utc::now().timestamp_millis()),
            None => webhook_url.to_string(),
        }
    }

    fn signed_url(webhook_url: &str, secret: &str, timestamp_millis: i64) -> String {
        let string_to_sign = format!("{timestamp_millis}\n{secret}");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        let sign = BASE64.encode(mac.finalize().into_bytes());

        let separator = if webhook_url.contains('?') { '&' } else { '?' };
        format!(
            "{webhook_url}{separator}timestamp={timestamp_millis}&sign={}",
            urlencoding::encode(&sign)
        )
    }

    fn build_payload(notification: &Notification) -> Value {
        let title = notification.title.as_deref().unwrap_or("通知");
        let mut text = format!(
            "### {} {}\n\n{}",
            notification.level.emoji(),
            title,
            notification.message
        );

        if !notification.metadata.is_empty() {
            text.push_str("\n\n---\n**Metadata**:\n");
            let lines: Vec<String> = notification
                .metadata
                .iter()
                .map(|(key, value)| format!("- **{key}**: {value}"))
                .collect();
            text.push_str(&lines.join("\n"));
        }

        text.push_str(&format!("\n\n---\n> 🕐 {}", send_time_string()));

        json!({
            "msgtype": "markdown",
            "markdown": { "title": title, "text": text }
        })
    }
}

#[async_trait]
impl Notifier for DingtalkNotifier {
    fn platform(&self) -> Platform {
        Platform::Dingtalk
    }

    /// The webhook URL alone gates the platform; the signing secret only
    /// changes how the delivery URL is built.
    fn is_configured(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    async fn send(&self, notification: &Notification) -> DeliveryOutcome {
        let Some(webhook_url) = self.webhook_url.as_deref().filter(|u| !u.is_empty()) else {
            return DeliveryOutcome::failed(
                Platform::Dingtalk,
                "DingTalk webhook URL not configured",
            );
        };

        let url = self.delivery_url(webhook_url);
        let payload = Self::build_payload(notification);
        debug!(
            platform = "dingtalk",
            signed = self.secret.is_some(),
            "sending markdown notification"
        );

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "dingtalk", error = %e, "delivery failed");
                return DeliveryOutcome::failed(Platform::Dingtalk, e.to_string());
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(platform = "dingtalk", error = %e, "backend returned error status");
                return DeliveryOutcome::failed(Platform::Dingtalk, e.to_string());
            }
        };

        match response.json::<DingtalkResponse>().await {
            Ok(DingtalkResponse {
                errcode: Some(0), ..
            }) => DeliveryOutcome::ok(Platform::Dingtalk),
            Ok(body) => DeliveryOutcome::failed(
                Platform::Dingtalk,
                body.errmsg.unwrap_or_else(|| "Unknown error".to_string()),
            ),
            Err(_) => DeliveryOutcome::failed(Platform::Dingtalk, "Unknown error"),
        }
    }
}
