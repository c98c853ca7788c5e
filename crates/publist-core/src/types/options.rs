//! Publish options chosen in the publish dialog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ProjectId, ResourceId};

/// Free-form parameters forwarded to virtual projects.
pub type PublishParams = BTreeMap<String, String>;

/// Options that select and expand the publish list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOptions {
    /// Project to publish; `None` selects the user's own publish list.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Whether to add modified siblings of each resource.
    #[serde(default)]
    pub include_siblings: bool,
    /// Whether to add resources the publish list depends on.
    #[serde(default = "default_include_related")]
    pub include_related: bool,
    /// Parameters for virtual projects.
    #[serde(default)]
    pub params: PublishParams,
}

fn default_include_related() -> bool {
    true
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            project_id: None,
            include_siblings: false,
            include_related: default_include_related(),
            params: PublishParams::new(),
        }
    }
}

impl PublishOptions {
    /// Selects a project.
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets the include-siblings flag.
    pub fn with_siblings(mut self, include_siblings: bool) -> Self {
        self.include_siblings = include_siblings;
        self
    }

    /// Sets the include-related flag.
    pub fn with_related(mut self, include_related: bool) -> Self {
        self.include_related = include_related;
        self
    }

    /// Adds a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns whether the user's own publish list is selected.
    pub fn uses_user_publish_list(&self) -> bool {
        self.project_id.is_none_or(|id| id.is_nil())
    }

    /// Returns a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a parameter parsed as a resource id, ignoring malformed values.
    pub fn id_param(&self, key: &str) -> Option<ResourceId> {
        self.param(key).and_then(|value| value.trim().parse().ok())
    }

    /// Returns a boolean parameter; only `true` (any case) is true.
    pub fn flag_param(&self, key: &str) -> bool {
        self.param(key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_related_only() {
        let options = PublishOptions::default();
        assert!(options.include_related);
        assert!(!options.include_siblings);
        assert!(options.uses_user_publish_list());
    }

    #[test]
    fn nil_project_selects_user_list() {
        let nil = ProjectId::from_uuid(uuid::Uuid::nil());
        assert!(PublishOptions::default().with_project(nil).uses_user_publish_list());

        let real = PublishOptions::default().with_project(ProjectId::new());
        assert!(!real.uses_user_publish_list());
    }

    #[test]
    fn typed_params() {
        let id = ResourceId::new();
        let options = PublishOptions::default()
            .with_param("containerpage", id.to_string())
            .with_param("add_contents", "TRUE")
            .with_param("broken", "not-a-uuid");
        assert_eq!(options.id_param("containerpage"), Some(id));
        assert_eq!(options.id_param("broken"), None);
        assert!(options.flag_param("add_contents"));
        assert!(!options.flag_param("missing"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let options: PublishOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PublishOptions::default());
    }
}
