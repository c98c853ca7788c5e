//! Serializable repository snapshot.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Project, Relation, Resource, ResourceId, UserId};
use crate::{Error, ErrorKind, Result};

/// A user known to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User id.
    pub id: UserId,
    /// Login name.
    pub name: String,
}

/// A lock held on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Locked resource.
    pub resource_id: ResourceId,
    /// Lock owner.
    pub owner: UserId,
}

/// A user who may not directly publish a resource (or anything below it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDenial {
    /// Affected user.
    pub user_id: UserId,
    /// Resource the denial is set on.
    pub resource_id: ResourceId,
}

/// A user's personal publish list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishListRecord {
    /// Owner of the list.
    pub user_id: UserId,
    /// Listed resources.
    pub resources: Vec<ResourceId>,
}

/// Complete state of a [`MemoryRepository`](super::MemoryRepository).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    /// Users.
    #[serde(default)]
    pub users: Vec<UserRecord>,
    /// Projects.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Relations.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Locks.
    #[serde(default)]
    pub locks: Vec<LockRecord>,
    /// Direct-publish permission denials.
    #[serde(default)]
    pub permission_denials: Vec<PermissionDenial>,
    /// Personal publish lists.
    #[serde(default)]
    pub publish_lists: Vec<PublishListRecord>,
}

impl RepositorySnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            Error::from_source(ErrorKind::InternalError, err)
                .with_message("failed to read repository snapshot")
                .with_context(format!("path: {}", path.display()))
        })?;
        Self::from_json(&json).map_err(|err| err.with_context(format!("path: {}", path.display())))
    }
}
