//! fanbell — fan-out notification dispatcher for chat webhooks.
//!
//! One logical notification goes in; platform-specific payloads go out to
//! Feishu, DingTalk, WeChat Work and Telegram concurrently, and the
//! per-target outcomes come back as one aggregate result.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod notification;
pub mod notifiers;
pub mod outcome;

// Re-export commonly used types for convenience
pub use config::Config;
pub use dispatch::{Dispatcher, MilestoneRequest, TaskCompleteRequest};
pub use errors::{AppError, AppResult};
pub use notification::{Level, Notification, Platform};
pub use outcome::{DeliveryOutcome, DispatchResult};
