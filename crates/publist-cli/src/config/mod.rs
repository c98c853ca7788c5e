//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── repository: RepositoryConfig # Snapshot, user, current project, session
//! ├── publish: PublishConfig       # Grouping thresholds, relation expansion
//! └── command: Command             # Operation to run
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! publist --snapshot repo.json --user editor --time-zone Europe/Berlin groups
//!
//! # Or via environment variables
//! PUBLIST_SNAPSHOT=repo.json PUBLIST_USER=editor publist groups
//! ```

mod repository;

use std::process;

use anyhow::Context;
use clap::Parser;
use publist_engine::PublishConfig;
pub use repository::RepositoryConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "publist")]
#[command(about = "Computes, groups and publishes CMS publish lists")]
#[command(version)]
pub struct Cli {
    /// Repository snapshot and request context.
    #[clap(flatten)]
    pub repository: RepositoryConfig,

    /// Publish list engine configuration.
    #[clap(flatten)]
    pub publish: PublishConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so that stdout only carries command output.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .context("failed to create env filter")?;

        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .context("failed to initialize tracing")?;

        Ok(())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.repository
            .validate()
            .context("invalid repository configuration")?;
        self.publish
            .validate()
            .context("invalid publish configuration")?;
        Ok(())
    }

    /// Logs configuration and build information.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information"
        );

        self.repository.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            session_gap = %self.publish.session_gap,
            young_days = self.publish.young_days,
            medium_days = self.publish.medium_days,
            resource_limit = self.publish.resource_limit,
            related_mode = %self.publish.related_mode,
            time_zone = ?self.publish.time_zone,
            "publish configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
