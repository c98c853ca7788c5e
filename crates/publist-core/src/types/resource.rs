//! Repository resources.

use std::hash::{Hash, Hasher};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use super::{ProjectId, ResourceId, UserId};

/// Offline change state of a resource compared to its online version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceState {
    /// Online and offline versions are identical.
    #[default]
    Unchanged,
    /// The resource does not exist online yet.
    New,
    /// The resource was modified since the last publish.
    Changed,
    /// The resource was deleted offline.
    Deleted,
}

impl ResourceState {
    /// Returns whether the resource is identical to its online version.
    #[inline]
    pub const fn is_unchanged(self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Returns whether the resource has never been published.
    #[inline]
    pub const fn is_new(self) -> bool {
        matches!(self, Self::New)
    }

    /// Returns whether the resource was modified (but not created or deleted).
    #[inline]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }

    /// Returns whether the resource was deleted offline.
    #[inline]
    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Whether a resource is a file or a folder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A file with content.
    #[default]
    File,
    /// A folder; its root path ends with `/`.
    Folder,
}

/// Filter applied when reading resources from a repository.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFilter {
    /// Every resource, including deleted ones.
    #[default]
    All,
    /// Resources that are not deleted.
    VisibleOnly,
    /// Resources whose state is not unchanged.
    ModifiedOnly,
}

impl ResourceFilter {
    /// Returns whether a resource in the given state passes this filter.
    pub fn accepts(self, state: ResourceState) -> bool {
        match self {
            Self::All => true,
            Self::VisibleOnly => !state.is_deleted(),
            Self::ModifiedOnly => !state.is_unchanged(),
        }
    }
}

/// A content item in the repository.
///
/// Two resources are equal when their structure ids are equal, regardless of
/// the snapshot of metadata each value carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Structure id, stable across moves.
    pub structure_id: ResourceId,
    /// Content id; siblings share it. Defaults to the structure id.
    #[serde(default)]
    pub content_id: Option<Uuid>,
    /// Absolute path in the repository.
    pub root_path: String,
    /// Name of the resource type (`plain`, `image`, `containerpage`, ...).
    pub type_name: String,
    /// File or folder.
    #[serde(default)]
    pub kind: ResourceKind,
    /// Offline change state.
    #[serde(default)]
    pub state: ResourceState,
    /// Time of the last modification.
    pub date_last_modified: Timestamp,
    /// User who last modified the resource.
    pub user_last_modified: UserId,
    /// Project in which the resource was last modified.
    pub project_last_modified: ProjectId,
    /// Value of the title property, if set.
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the resource is flagged as a temporary editor file.
    #[serde(default)]
    pub temporary: bool,
}

impl Resource {
    /// Returns the id of the content shared between siblings.
    pub fn content_id(&self) -> Uuid {
        self.content_id
            .unwrap_or_else(|| self.structure_id.as_uuid())
    }

    /// Returns whether this resource is a file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    /// Returns whether this resource is a folder.
    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == ResourceKind::Folder
    }

    /// Returns the last path segment, without a trailing slash for folders.
    pub fn name(&self) -> &str {
        let trimmed = self.root_path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Returns the root path of the parent folder, or `None` for the root.
    pub fn parent_path(&self) -> Option<&str> {
        let trimmed = self.root_path.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        trimmed.rfind('/').map(|index| &self.root_path[..=index])
    }

    /// Returns whether the resource is a temporary file left by an editor.
    ///
    /// Temporary files either carry the temporary flag or have a name starting
    /// with `~`.
    pub fn is_temporary(&self) -> bool {
        self.temporary || (self.is_file() && self.name().starts_with('~'))
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.structure_id == other.structure_id
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.structure_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(path: &str, kind: ResourceKind) -> Resource {
        Resource {
            structure_id: ResourceId::new(),
            content_id: None,
            root_path: path.into(),
            type_name: "plain".into(),
            kind,
            state: ResourceState::New,
            date_last_modified: Timestamp::UNIX_EPOCH,
            user_last_modified: UserId::new(),
            project_last_modified: ProjectId::new(),
            title: None,
            temporary: false,
        }
    }

    #[test]
    fn parent_path_of_file_and_folder() {
        let file = resource("/sites/default/news/a.html", ResourceKind::File);
        assert_eq!(file.parent_path(), Some("/sites/default/news/"));
        assert_eq!(file.name(), "a.html");

        let folder = resource("/sites/default/news/", ResourceKind::Folder);
        assert_eq!(folder.parent_path(), Some("/sites/default/"));
        assert_eq!(folder.name(), "news");

        let root = resource("/", ResourceKind::Folder);
        assert_eq!(root.parent_path(), None);
    }

    #[test]
    fn temporary_files_by_name_or_flag() {
        assert!(resource("/sites/default/~a.html", ResourceKind::File).is_temporary());
        assert!(!resource("/sites/default/a.html", ResourceKind::File).is_temporary());

        let mut flagged = resource("/sites/default/b.html", ResourceKind::File);
        flagged.temporary = true;
        assert!(flagged.is_temporary());
    }

    #[test]
    fn equality_uses_structure_id() {
        let a = resource("/a", ResourceKind::File);
        let mut b = a.clone();
        b.root_path = "/moved".into();
        assert_eq!(a, b);
        assert_ne!(a, resource("/a", ResourceKind::File));
    }

    #[test]
    fn filters_accept_states() {
        assert!(ResourceFilter::All.accepts(ResourceState::Deleted));
        assert!(!ResourceFilter::VisibleOnly.accepts(ResourceState::Deleted));
        assert!(!ResourceFilter::ModifiedOnly.accepts(ResourceState::Unchanged));
        assert!(ResourceFilter::ModifiedOnly.accepts(ResourceState::New));
    }

    #[test]
    fn siblings_share_content_id() {
        let a = resource("/a", ResourceKind::File);
        let mut b = resource("/b", ResourceKind::File);
        b.content_id = Some(a.content_id());
        assert_eq!(a.content_id(), b.content_id());
    }
}
