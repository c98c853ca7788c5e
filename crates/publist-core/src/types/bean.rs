//! Serializable projections handed to the publish dialog.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, IntoStaticStr};

use super::{ResourceId, ResourceState};

/// Why a resource in the publish list cannot be published as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InfoKind {
    /// Already published; the resource is unchanged.
    Published,
    /// The user lacks the direct-publish permission.
    Permissions,
    /// Locked by another user.
    Locked,
    /// The resource could not be read.
    Missing,
    /// Publishing would leave a broken link.
    BrokenLink,
    /// Listed because another resource in the list depends on it.
    Related,
}

impl InfoKind {
    /// Returns whether this kind prevents publishing the resource.
    pub const fn blocks_publish(self) -> bool {
        matches!(
            self,
            Self::Published | Self::Permissions | Self::Locked | Self::Missing
        )
    }
}

/// Annotation attached to a [`PublishResource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResourceInfo {
    /// Reason category.
    #[serde(rename = "type")]
    pub kind: InfoKind,
    /// Human readable explanation.
    pub message: String,
}

impl PublishResourceInfo {
    /// Creates a new annotation.
    pub fn new(kind: InfoKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A resource as listed in the publish dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResource {
    /// Structure id.
    pub id: ResourceId,
    /// Root path.
    pub name: String,
    /// Title, falling back to the resource name.
    pub title: String,
    /// Resource type name.
    pub resource_type: String,
    /// Offline state.
    pub state: ResourceState,
    /// Time of the last modification.
    pub date_last_modified: Timestamp,
    /// Name of the user who last modified the resource.
    pub user_last_modified: String,
    /// Whether the user may remove the resource from the publish list.
    pub removable: bool,
    /// Why the resource cannot be published, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PublishResourceInfo>,
    /// Resources published together with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<PublishResource>,
}

impl PublishResource {
    /// Returns whether an annotation prevents publishing this resource.
    pub fn is_blocked(&self) -> bool {
        self.info
            .as_ref()
            .is_some_and(|info| info.kind.blocks_publish())
    }
}

/// A named bucket of publish resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishGroup {
    /// Display name.
    pub name: String,
    /// Members, newest first.
    pub resources: Vec<PublishResource>,
}

impl PublishGroup {
    /// Creates a group.
    pub fn new(name: impl Into<String>, resources: Vec<PublishResource>) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }
}
