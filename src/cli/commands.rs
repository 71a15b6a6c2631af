//! Command definitions for the CLI shell.
//!
//! The shell validates arguments and hands a fully-formed request to the
//! dispatch engine; it carries no delivery logic of its own.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fanbell::Level;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "fanbell")]
#[command(about = "Fan-out notification dispatcher for chat webhooks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file (default: ~/.config/fanbell/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send a notification to one or more platforms
    Send {
        /// Notification message body
        message: String,

        /// Optional title (platforms substitute a default when absent)
        #[arg(short, long)]
        title: Option<String>,

        /// Severity level: info, success, warning or error
        #[arg(short, long, default_value = "info")]
        level: Level,

        /// Metadata entry in KEY=VALUE form; repeatable, order preserved
        #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
        meta: Vec<(String, String)>,

        /// Target platform (feishu, dingtalk, wechat, telegram or all); repeatable
        #[arg(short = 'p', long = "platform", default_values_t = [String::from("all")])]
        platforms: Vec<String>,
    },

    /// Notify that a task has been completed
    TaskComplete {
        /// Name of the completed task
        task_name: String,

        /// Brief summary of what was accomplished
        summary: String,

        /// Time taken (e.g. "5 minutes")
        #[arg(short, long)]
        duration: Option<String>,

        /// Detailed information about the completion
        #[arg(long)]
        details: Option<String>,

        /// Target platform; repeatable
        #[arg(short = 'p', long = "platform", default_values_t = [String::from("all")])]
        platforms: Vec<String>,
    },

    /// Notify that a project milestone has been reached
    Milestone {
        /// Milestone name or description
        milestone: String,

        /// Progress indicator (e.g. "50%" or "3/5 tasks")
        progress: String,

        /// What comes next
        #[arg(long)]
        next_steps: Option<String>,

        /// Target platform; repeatable
        #[arg(short = 'p', long = "platform", default_values_t = [String::from("all")])]
        platforms: Vec<String>,
    },

    /// Show which platforms are configured
    Status,
}

/// Parse a `KEY=VALUE` metadata argument.
fn parse_meta(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
