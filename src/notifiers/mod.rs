//! Target adapters: one per chat backend.
//!
//! Every adapter implements the same contract: a pure configuration
//! predicate and an infallible `send` that renders the platform-specific
//! payload, performs exactly one HTTP POST, and folds any failure
//! (missing credentials, transport error, backend rejection, malformed
//! response) into the returned [`DeliveryOutcome`]. Nothing an adapter
//! does can abort deliveries to other platforms.

pub mod dingtalk;
pub mod feishu;
pub mod telegram;
pub mod wechat;

pub use dingtalk::DingtalkNotifier;
pub use feishu::FeishuNotifier;
pub use telegram::TelegramNotifier;
pub use wechat::WechatNotifier;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use crate::errors::{AppError, AppResult};
use crate::notification::{Notification, Platform};
use crate::outcome::DeliveryOutcome;

/// Hard cap on each delivery attempt, including connect time.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Shared adapter contract.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The backend this adapter delivers to.
    fn platform(&self) -> Platform;

    /// Pure predicate over the captured credentials; no I/O.
    fn is_configured(&self) -> bool;

    /// Render, sign where required, deliver and interpret the response.
    /// All errors are recovered into the outcome.
    async fn send(&self, notification: &Notification) -> DeliveryOutcome;
}

/// Build the per-adapter HTTP client with the bounded send timeout.
pub(crate) fn build_http_client(platform: &'static str) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .map_err(|e| AppError::http_client(platform, e))
}

/// Human-readable send-time string embedded in payloads. Display only,
/// formatted in the host's local timezone.
pub(crate) fn send_time_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
