//! Request context.

use serde::{Deserialize, Serialize};

use super::{ProjectId, UserId};

/// The user and project a publish request runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsContext {
    /// Current user.
    pub user_id: UserId,
    /// Login name of the current user.
    pub user_name: String,
    /// Offline project the user is working in.
    pub current_project: ProjectId,
    /// HTTP session the request belongs to, if any.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CmsContext {
    /// Creates a context without a session.
    pub fn new(user_id: UserId, user_name: impl Into<String>, current_project: ProjectId) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            current_project,
            session_id: None,
        }
    }

    /// Attaches a session id.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
