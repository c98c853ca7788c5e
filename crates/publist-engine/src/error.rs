//! Publish engine error types.

use publist_core::types::ProjectId;
use thiserror::Error;

/// Result type for publish engine operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that abort a publish-list request.
///
/// Failures concerning a single resource never show up here: they are logged
/// and the resource is excluded or annotated instead.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A repository port failed.
    #[error("repository error: {0}")]
    Repository(#[from] publist_core::Error),

    /// The selected project does not exist.
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The publish options cannot be satisfied.
    #[error("invalid publish options: {0}")]
    InvalidOptions(String),

    /// The engine configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured time zone is unknown.
    #[error("unknown time zone '{name}'")]
    TimeZone {
        /// Configured zone name.
        name: String,
        /// Lookup failure.
        #[source]
        source: jiff::Error,
    },
}

impl PublishError {
    /// Returns a short machine readable code for this error.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Repository(_) => "repository",
            Self::ProjectNotFound(_) => "project_not_found",
            Self::InvalidOptions(_) => "invalid_options",
            Self::InvalidConfig(_) => "invalid_config",
            Self::TimeZone { .. } => "time_zone",
        }
    }
}
