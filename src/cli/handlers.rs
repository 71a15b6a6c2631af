//! Command handlers: translate parsed CLI commands into dispatcher calls
//! and render the aggregate result as text.

use anyhow::Result;

use fanbell::{Dispatcher, MilestoneRequest, Notification, TaskCompleteRequest};

use super::commands::Commands;
use super::context::CliContext;

pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        let dispatcher = Dispatcher::from_config(&self.context.config)?;

        match command {
            Commands::Send {
                message,
                title,
                level,
                meta,
                platforms,
            } => {
                let mut notification = Notification::new(message).with_level(level);
                if let Some(title) = title {
                    notification = notification.with_title(title);
                }
                notification = notification.with_metadata(meta);

                let result = dispatcher.dispatch(&notification, &platforms).await?;
                println!("{}", result.render());
            }

            Commands::TaskComplete {
                task_name,
                summary,
                duration,
                details,
                platforms,
            } => {
                let result = dispatcher
                    .notify_task_complete(TaskCompleteRequest {
                        task_name,
                        summary,
                        duration,
                        details,
                        targets: platforms,
                    })
                    .await?;
                println!("{}", result.render());
            }

            Commands::Milestone {
                milestone,
                progress,
                next_steps,
                platforms,
            } => {
                let result = dispatcher
                    .notify_milestone(MilestoneRequest {
                        milestone,
                        progress,
                        next_steps,
                        targets: platforms,
                    })
                    .await?;
                println!("{}", result.render());
            }

            Commands::Status => {
                println!("{}", render_status(&dispatcher));
            }
        }

        Ok(())
    }
}

/// Render the configuration report: which platforms are usable.
fn render_status(dispatcher: &Dispatcher) -> String {
    let status = dispatcher.configuration_status();

    let configured: Vec<String> = status
        .iter()
        .filter(|(_, ok)| *ok)
        .map(|(p, _)| p.to_string())
        .collect();
    let missing: Vec<String> = status
        .iter()
        .filter(|(_, ok)| !*ok)
        .map(|(p, _)| p.to_string())
        .collect();

    let join = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    format!(
        "Notification platform status\n\n\
         ✅ Configured ({}): {}\n\
         ⚠️ Not configured ({}): {}\n\n\
         Hint: set webhook URLs / bot credentials via environment variables or the config file",
        configured.len(),
        join(&configured),
        missing.len(),
        join(&missing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanbell::Config;

    #[test]
    fn status_report_lists_both_groups() {
        let mut config = Config::default();
        config.feishu.webhook_url = Some("https://open.feishu.example/hook".into());

        let dispatcher = Dispatcher::from_config(&config).unwrap();
        let report = render_status(&dispatcher);

        assert!(report.contains("✅ Configured (1): feishu"));
        assert!(report.contains("⚠️ Not configured (3): dingtalk, wechat, telegram"));
    }

    #[test]
    fn status_report_handles_nothing_configured() {
        let dispatcher = Dispatcher::from_config(&Config::default()).unwrap();
        let report = render_status(&dispatcher);
        assert!(report.contains("✅ Configured (0): none"));
    }
}
