//! Projects.

use serde::{Deserialize, Serialize};

use super::{ProjectId, UserId};

/// A persisted project in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project id.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Users allowed to manage (and therefore publish) the project.
    #[serde(default)]
    pub managers: Vec<UserId>,
}

/// A project as offered in the publish dialog's project selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBean {
    /// Project id.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Description shown as a tooltip.
    pub description: String,
    /// Whether this is a virtual (non-persistent) project.
    pub is_virtual: bool,
}

impl ProjectBean {
    /// Creates a bean for a virtual project.
    pub fn virtual_project(
        id: ProjectId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            is_virtual: true,
        }
    }
}

impl From<&Project> for ProjectBean {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            is_virtual: false,
        }
    }
}
