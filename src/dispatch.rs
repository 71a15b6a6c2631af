//! The dispatch engine: resolves a target selection, fans the
//! notification out to the selected adapters concurrently and aggregates
//! the outcomes.
//!
//! Fan-out invariants:
//! - the `"all"` wildcard expands to the canonical platform list once,
//!   before dispatch, and takes precedence over any explicit entries;
//! - unrecognized identifiers are skipped silently and contribute no
//!   outcome;
//! - one adapter's failure (including a panicked task) never affects the
//!   other deliveries;
//! - outcome order always matches the resolved selection order, not
//!   completion order.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::notification::{Level, Notification, Platform};
use crate::notifiers::{
    DingtalkNotifier, FeishuNotifier, Notifier, TelegramNotifier, WechatNotifier,
};
use crate::outcome::{DeliveryOutcome, DispatchResult};

/// The wildcard target selector.
pub const ALL_TARGETS: &str = "all";

/// Resolve a requested target list to concrete platforms.
///
/// Wildcard expansion is computed once up front; otherwise the caller's
/// order (and duplicates) are preserved and unknown names are dropped.
pub fn resolve_targets(requested: &[String]) -> Vec<Platform> {
    if requested.iter().any(|t| t == ALL_TARGETS) {
        return Platform::ALL.to_vec();
    }
    requested
        .iter()
        .filter_map(|name| match name.parse::<Platform>() {
            Ok(platform) => Some(platform),
            Err(_) => {
                debug!(target = %name, "skipping unrecognized target");
                None
            }
        })
        .collect()
}

/// Arguments of the task-completion convenience operation.
#[derive(Debug, Clone)]
pub struct TaskCompleteRequest {
    pub task_name: String,
    pub summary: String,
    pub duration: Option<String>,
    pub details: Option<String>,
    pub targets: Vec<String>,
}

/// Arguments of the milestone convenience operation.
#[derive(Debug, Clone)]
pub struct MilestoneRequest {
    pub milestone: String,
    pub progress: String,
    pub next_steps: Option<String>,
    pub targets: Vec<String>,
}

/// Owns the four adapters and runs the fan-out.
///
/// Adapters are built once from the immutable [`Config`] and held in
/// canonical order. The dispatcher keeps no other state; every dispatch
/// is a single stateless request/response cycle.
pub struct Dispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl Dispatcher {
    /// Build the dispatcher with the four real adapters.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let notifiers: Vec<Arc<dyn Notifier>> = vec![
            Arc::new(FeishuNotifier::new(&config.feishu)?),
            Arc::new(DingtalkNotifier::new(&config.dingtalk)?),
            Arc::new(WechatNotifier::new(&config.wechat)?),
            Arc::new(TelegramNotifier::new(&config.telegram)?),
        ];
        Ok(Dispatcher { notifiers })
    }

    /// Build a dispatcher over arbitrary adapters. Used by tests to
    /// inject stub notifiers.
    pub fn with_notifiers(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Dispatcher { notifiers }
    }

    fn notifier_for(&self, platform: Platform) -> Option<Arc<dyn Notifier>> {
        self.notifiers
            .iter()
            .find(|n| n.platform() == platform)
            .cloned()
    }

    /// Deliver one notification to the selected targets.
    ///
    /// Each selected adapter runs as its own task; tasks are joined in
    /// selection order so the result sequence matches the request. A
    /// panicked task is converted into a failed outcome for that
    /// platform only. The only hard error is a contract violation in
    /// the notification itself.
    pub async fn dispatch(
        &self,
        notification: &Notification,
        targets: &[String],
    ) -> AppResult<DispatchResult> {
        notification.validate()?;

        let platforms = resolve_targets(targets);
        debug!(targets = ?platforms, level = %notification.level, "dispatching notification");

        let mut handles = Vec::with_capacity(platforms.len());
        for platform in platforms {
            let Some(notifier) = self.notifier_for(platform) else {
                // Dispatcher built without this adapter (test setups).
                handles.push((platform, None));
                continue;
            };
            let notification = notification.clone();
            let handle =
                tokio::spawn(async move { notifier.send(&notification).await });
            handles.push((platform, Some(handle)));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (platform, handle) in handles {
            let outcome = match handle {
                Some(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(platform = %platform, error = %e, "delivery task failed");
                        DeliveryOutcome::failed(platform, e.to_string())
                    }
                },
                None => DeliveryOutcome::failed(platform, "platform not configured"),
            };
            outcomes.push(outcome);
        }

        Ok(DispatchResult::new(outcomes))
    }

    /// Convenience wrapper announcing a completed task. Pure request
    /// shaping on top of [`Dispatcher::dispatch`].
    pub async fn notify_task_complete(
        &self,
        request: TaskCompleteRequest,
    ) -> AppResult<DispatchResult> {
        let mut message = format!("📋 **Task completed**\n\n**Task**: {}", request.task_name);
        if let Some(duration) = &request.duration {
            message.push_str(&format!("\n**Duration**: {duration}"));
        }
        message.push_str(&format!("\n\n**Summary**: {}", request.summary));
        if let Some(details) = &request.details {
            message.push_str(&format!("\n\n**Details**: {details}"));
        }

        let mut metadata = vec![("task".to_string(), request.task_name.clone())];
        if let Some(duration) = &request.duration {
            metadata.push(("duration".to_string(), duration.clone()));
        }
        metadata.push(("type".to_string(), "task_complete".to_string()));

        let notification = Notification::new(message)
            .with_title(format!("✅ Task complete: {}", request.task_name))
            .with_level(Level::Success)
            .with_metadata(metadata);

        self.dispatch(&notification, &request.targets).await
    }

    /// Convenience wrapper announcing a project milestone.
    pub async fn notify_milestone(
        &self,
        request: MilestoneRequest,
    ) -> AppResult<DispatchResult> {
        let mut message = format!(
            "🎯 **Milestone reached**\n\n**Milestone**: {}\n**Progress**: {}",
            request.milestone, request.progress
        );
        if let Some(next_steps) = &request.next_steps {
            message.push_str(&format!("\n\n**Next steps**: {next_steps}"));
        }

        let metadata = vec![
            ("milestone".to_string(), request.milestone.clone()),
            ("progress".to_string(), request.progress.clone()),
            ("type".to_string(), "milestone".to_string()),
        ];

        let notification = Notification::new(message)
            .with_title(format!("🎯 Milestone: {}", request.milestone))
            .with_level(Level::Info)
            .with_metadata(metadata);

        self.dispatch(&notification, &request.targets).await
    }

    /// Which platforms are usable, in canonical order. Queries each
    /// adapter's configuration gate; no I/O.
    pub fn configuration_status(&self) -> Vec<(Platform, bool)> {
        self.notifiers
            .iter()
            .map(|n| (n.platform(), n.is_configured()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    /// Scripted adapter for exercising the dispatcher without network I/O.
    struct StubNotifier {
        platform: Platform,
        configured: bool,
        fail_with: Option<String>,
        delay: Duration,
        calls: AtomicUsize,
        panic_on_send: bool,
    }

    impl StubNotifier {
        fn ok(platform: Platform) -> Arc<Self> {
            Arc::new(StubNotifier {
                platform,
                configured: true,
                fail_with: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                panic_on_send: false,
            })
        }

        fn failing(platform: Platform, error: &str) -> Arc<Self> {
            Arc::new(StubNotifier {
                platform,
                configured: true,
                fail_with: Some(error.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                panic_on_send: false,
            })
        }

        fn slow(platform: Platform, delay: Duration) -> Arc<Self> {
            Arc::new(StubNotifier {
                platform,
                configured: true,
                fail_with: None,
                delay,
                calls: AtomicUsize::new(0),
                panic_on_send: false,
            })
        }

        fn unconfigured(platform: Platform) -> Arc<Self> {
            Arc::new(StubNotifier {
                platform,
                configured: false,
                fail_with: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                panic_on_send: false,
            })
        }

        fn panicking(platform: Platform) -> Arc<Self> {
            Arc::new(StubNotifier {
                platform,
                configured: true,
                fail_with: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                panic_on_send: true,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Notifier for StubNotifier {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, _notification: &Notification) -> DeliveryOutcome {
            if !self.configured {
                return DeliveryOutcome::failed(self.platform, "platform not configured");
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_send {
                panic!("stub adapter blew up");
            }
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            match &self.fail_with {
                Some(error) => DeliveryOutcome::failed(self.platform, error.clone()),
                None => DeliveryOutcome::ok(self.platform),
            }
        }
    }

    fn all_ok_dispatcher() -> (Dispatcher, Vec<Arc<StubNotifier>>) {
        let stubs: Vec<Arc<StubNotifier>> =
            Platform::ALL.iter().map(|p| StubNotifier::ok(*p)).collect();
        let notifiers = stubs
            .iter()
            .map(|s| s.clone() as Arc<dyn Notifier>)
            .collect();
        (Dispatcher::with_notifiers(notifiers), stubs)
    }

    #[test]
    fn wildcard_expands_to_canonical_set() {
        let targets = vec!["all".to_string()];
        assert_eq!(resolve_targets(&targets), Platform::ALL.to_vec());
    }

    #[test]
    fn wildcard_wins_over_explicit_entries() {
        // "all" takes precedence no matter where it appears.
        let targets = vec![
            "telegram".to_string(),
            "all".to_string(),
            "feishu".to_string(),
        ];
        assert_eq!(resolve_targets(&targets), Platform::ALL.to_vec());
    }

    #[test]
    fn explicit_selection_preserves_order_and_drops_unknown() {
        let targets = vec![
            "telegram".to_string(),
            "slack".to_string(),
            "feishu".to_string(),
        ];
        assert_eq!(
            resolve_targets(&targets),
            vec![Platform::Telegram, Platform::Feishu]
        );
    }

    #[tokio::test]
    async fn dispatch_rejects_empty_message() {
        let (dispatcher, _) = all_ok_dispatcher();
        let result = dispatcher
            .dispatch(&Notification::new(""), &["all".to_string()])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn outcome_count_matches_recognized_targets() {
        let (dispatcher, _) = all_ok_dispatcher();
        let result = dispatcher
            .dispatch(
                &Notification::new("hi"),
                &["wechat".to_string(), "nonsense".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(result.total(), 1);
        assert_eq!(result.outcomes[0].platform, Platform::Wechat);
    }

    #[tokio::test]
    async fn one_failure_never_aborts_the_others() {
        let stubs: Vec<Arc<dyn Notifier>> = vec![
            StubNotifier::ok(Platform::Feishu),
            StubNotifier::failing(Platform::Dingtalk, "timeout"),
            StubNotifier::ok(Platform::Wechat),
            StubNotifier::panicking(Platform::Telegram),
        ];
        let dispatcher = Dispatcher::with_notifiers(stubs);

        let result = dispatcher
            .dispatch(&Notification::new("hi"), &["all".to_string()])
            .await
            .unwrap();

        assert_eq!(result.total(), 4);
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.summary_line(), "2/4 platform(s) notified");
        assert_eq!(result.outcomes[1].error.as_deref(), Some("timeout"));
        // The panicked task is folded into a failed outcome.
        assert!(!result.outcomes[3].success);
    }

    #[tokio::test]
    async fn results_keep_request_order_despite_completion_order() {
        let slow = StubNotifier::slow(Platform::Feishu, Duration::from_millis(50));
        let fast = StubNotifier::ok(Platform::Telegram);
        let dispatcher = Dispatcher::with_notifiers(vec![slow, fast]);

        let result = dispatcher
            .dispatch(
                &Notification::new("hi"),
                &["feishu".to_string(), "telegram".to_string()],
            )
            .await
            .unwrap();

        let order: Vec<Platform> = result.outcomes.iter().map(|o| o.platform).collect();
        assert_eq!(order, vec![Platform::Feishu, Platform::Telegram]);
    }

    #[tokio::test]
    async fn unconfigured_adapter_reports_without_sending() {
        let stub = StubNotifier::unconfigured(Platform::Feishu);
        let dispatcher = Dispatcher::with_notifiers(vec![stub.clone()]);

        let result = dispatcher
            .dispatch(&Notification::new("hi"), &["feishu".to_string()])
            .await
            .unwrap();

        assert!(!result.outcomes[0].success);
        assert_eq!(
            result.outcomes[0].error.as_deref(),
            Some("platform not configured")
        );
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn dispatch_is_idempotent_for_identical_inputs() {
        let (dispatcher, _) = all_ok_dispatcher();
        let notification = Notification::new("same").with_title("t");
        let targets = vec!["all".to_string()];

        let first = dispatcher.dispatch(&notification, &targets).await.unwrap();
        let second = dispatcher.dispatch(&notification, &targets).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn task_complete_builds_success_notification() {
        let (dispatcher, stubs) = all_ok_dispatcher();
        let result = dispatcher
            .notify_task_complete(TaskCompleteRequest {
                task_name: "Build".to_string(),
                summary: "done".to_string(),
                duration: Some("5 minutes".to_string()),
                details: None,
                targets: vec!["all".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(result.summary_line(), "4/4 platform(s) notified");
        for stub in &stubs {
            assert_eq!(stub.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn milestone_targets_only_selected_platforms() {
        let (dispatcher, stubs) = all_ok_dispatcher();
        let result = dispatcher
            .notify_milestone(MilestoneRequest {
                milestone: "Beta".to_string(),
                progress: "3/5 tasks".to_string(),
                next_steps: Some("polish docs".to_string()),
                targets: vec!["telegram".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(result.total(), 1);
        assert_eq!(result.outcomes[0].platform, Platform::Telegram);
        // Only the telegram stub was invoked.
        assert_eq!(stubs[3].call_count(), 1);
        assert_eq!(stubs[0].call_count(), 0);
    }

    #[tokio::test]
    async fn configuration_status_reflects_gates() {
        let dispatcher = Dispatcher::with_notifiers(vec![
            StubNotifier::ok(Platform::Feishu),
            StubNotifier::unconfigured(Platform::Dingtalk),
        ]);
        assert_eq!(
            dispatcher.configuration_status(),
            vec![(Platform::Feishu, true), (Platform::Dingtalk, false)]
        );
    }
}
