//! CLI execution context: configuration and logging setup shared by
//! all command handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};

use fanbell::Config;

/// Shared state for one CLI invocation. Credentials are captured here,
/// once, and stay immutable for the rest of the process.
pub struct CliContext {
    pub verbose: bool,
    pub config: Config,
}

impl CliContext {
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let config =
            Config::load(config_path.as_deref()).context("Failed to load configuration")?;
        Ok(Self { verbose, config })
    }

    /// Initialize the tracing subscriber. `-v` flips the default level
    /// to debug; `RUST_LOG` still overrides everything.
    pub fn init_logging(&self) -> Result<()> {
        let default_level = if self.verbose { "debug" } else { "warn" };

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env().add_directive(
                    default_level
                        .parse()
                        .unwrap_or_else(|_| tracing::Level::WARN.into()),
                ),
            )
            .with_writer(std::io::stderr)
            .init();

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
        }

        Ok(())
    }
}
