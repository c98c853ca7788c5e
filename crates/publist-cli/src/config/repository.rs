//! Repository snapshot and request context configuration.

use std::path::PathBuf;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where the repository comes from and who the request runs as.
///
/// # Environment Variables
///
/// - `PUBLIST_SNAPSHOT` - path to the JSON repository snapshot
/// - `PUBLIST_USER` - login name of the acting user
/// - `PUBLIST_CURRENT_PROJECT` - name of the offline project the user works in
/// - `PUBLIST_SESSION` - session id publish options are remembered under
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct RepositoryConfig {
    /// Path to the JSON repository snapshot.
    #[arg(long, env = "PUBLIST_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Login name of the user the request runs as.
    #[arg(short = 'u', long, env = "PUBLIST_USER")]
    pub user: String,

    /// Name of the offline project the user works in.
    ///
    /// Defaults to the first project the user manages, then to the first
    /// project of the snapshot.
    #[arg(long, env = "PUBLIST_CURRENT_PROJECT")]
    #[serde(default)]
    pub current_project: Option<String>,

    /// Session id publish options are remembered under.
    #[arg(long, env = "PUBLIST_SESSION")]
    #[serde(default)]
    pub session: Option<String>,
}

impl RepositoryConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a file or the user name is
    /// blank.
    pub fn validate(&self) -> AnyhowResult<()> {
        if !self.snapshot.is_file() {
            return Err(anyhow!(
                "Snapshot {} does not exist or is not a file.",
                self.snapshot.display()
            ));
        }

        if self.user.trim().is_empty() {
            return Err(anyhow!("User name must not be empty."));
        }

        Ok(())
    }

    /// Logs the configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            snapshot = %self.snapshot.display(),
            user = %self.user,
            current_project = ?self.current_project,
            session = self.session.is_some(),
            "repository configuration"
        );
    }
}
