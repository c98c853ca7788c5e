//! Repository scenarios shared by the unit tests.

use jiff::{SignedDuration, Timestamp};
use publist_core::memory::MemoryRepository;
use publist_core::repository::{
    LockStore, PermissionStore, ProjectStore, Publisher, RelationStore, ResourceStore,
};
use publist_core::types::{
    CmsContext, Project, ProjectId, Relation, RelationFilter, RelationType, Resource,
    ResourceFilter, ResourceId, ResourceKind, ResourceState, UserId,
};
use publist_core::{Error, Result};
use uuid::Uuid;

use crate::PublishConfig;

/// Fixed "now" used by every scenario: 2026-10-18 12:00 UTC.
pub(crate) const NOW: &str = "2026-10-18T12:00:00Z";

pub(crate) struct Scenario {
    pub repository: MemoryRepository,
    pub ctx: CmsContext,
    pub other: UserId,
    pub project: ProjectId,
    pub now: Timestamp,
}

impl Scenario {
    /// An editor managing the `Offline` project, another user, and an
    /// unchanged root folder.
    pub fn new() -> Self {
        let repository = MemoryRepository::new();
        let user = UserId::new();
        let other = UserId::new();
        let project = ProjectId::new();
        repository.insert_user(user, "editor");
        repository.insert_user(other, "other");
        repository.insert_project(Project {
            id: project,
            name: "Offline".into(),
            description: "Main offline project".into(),
            managers: vec![user],
        });

        let scenario = Self {
            repository,
            ctx: CmsContext::new(user, "editor", project),
            other,
            project,
            now: NOW.parse().unwrap(),
        };
        scenario.folder("/", ResourceState::Unchanged);
        scenario
    }

    pub fn config(&self) -> PublishConfig {
        PublishConfig {
            time_zone: Some("UTC".into()),
            ..PublishConfig::default()
        }
    }

    pub fn folder(&self, path: &str, state: ResourceState) -> Resource {
        self.insert(path, "folder", ResourceKind::Folder, state, self.now)
    }

    pub fn file(&self, path: &str, type_name: &str, state: ResourceState) -> Resource {
        self.insert(path, type_name, ResourceKind::File, state, self.now)
    }

    /// A changed plain file modified `age` before now.
    pub fn file_aged(&self, path: &str, age: SignedDuration) -> Resource {
        let modified = self.now.checked_sub(age).unwrap();
        self.insert(path, "plain", ResourceKind::File, ResourceState::Changed, modified)
    }

    pub fn relate(&self, source: &Resource, target: &Resource, relation_type: RelationType) {
        self.repository.add_relation(Relation {
            source_id: source.structure_id,
            target_id: Some(target.structure_id),
            target_path: target.root_path.clone(),
            relation_type,
        });
    }

    pub fn ids(resources: &[&Resource]) -> Vec<ResourceId> {
        resources.iter().map(|r| r.structure_id).collect()
    }

    fn insert(
        &self,
        path: &str,
        type_name: &str,
        kind: ResourceKind,
        state: ResourceState,
        modified: Timestamp,
    ) -> Resource {
        let resource = Resource {
            structure_id: ResourceId::new(),
            content_id: None,
            root_path: path.into(),
            type_name: type_name.into(),
            kind,
            state,
            date_last_modified: modified,
            user_last_modified: self.ctx.user_id,
            project_last_modified: self.project,
            title: None,
            temporary: false,
        };
        self.repository.insert_resource(resource.clone());
        resource
    }
}

/// Delegates to a [`MemoryRepository`] but fails selected reads with an
/// internal error.
pub(crate) struct FailingRepository<'a> {
    pub inner: &'a MemoryRepository,
    pub fail_folder_reads: bool,
    pub fail_relation_reads: bool,
}

impl<'a> FailingRepository<'a> {
    pub fn new(inner: &'a MemoryRepository) -> Self {
        Self {
            inner,
            fail_folder_reads: false,
            fail_relation_reads: false,
        }
    }

    pub fn failing_folder_reads(mut self) -> Self {
        self.fail_folder_reads = true;
        self
    }

    pub fn failing_relation_reads(mut self) -> Self {
        self.fail_relation_reads = true;
        self
    }

    fn offline() -> Error {
        Error::internal_error().with_message("storage offline")
    }
}

impl ResourceStore for FailingRepository<'_> {
    fn read_resource(&self, id: ResourceId, filter: ResourceFilter) -> Result<Resource> {
        self.inner.read_resource(id, filter)
    }

    fn read_resource_by_path(&self, path: &str, filter: ResourceFilter) -> Result<Resource> {
        self.inner.read_resource_by_path(path, filter)
    }

    fn read_parent_folder(&self, id: ResourceId) -> Result<Option<Resource>> {
        self.inner.read_parent_folder(id)
    }

    fn read_siblings(&self, resource: &Resource, filter: ResourceFilter) -> Result<Vec<Resource>> {
        self.inner.read_siblings(resource, filter)
    }

    fn read_resources(
        &self,
        folder_path: &str,
        filter: ResourceFilter,
        recursive: bool,
    ) -> Result<Vec<Resource>> {
        if self.fail_folder_reads {
            return Err(Self::offline());
        }
        self.inner.read_resources(folder_path, filter, recursive)
    }

    fn user_name(&self, id: UserId) -> Result<String> {
        self.inner.user_name(id)
    }
}

impl RelationStore for FailingRepository<'_> {
    fn read_relations(&self, id: ResourceId, filter: RelationFilter) -> Result<Vec<Relation>> {
        self.inner.read_relations(id, filter)
    }

    fn read_relation_target(
        &self,
        relation: &Relation,
        filter: ResourceFilter,
    ) -> Result<Resource> {
        if self.fail_relation_reads {
            return Err(Self::offline());
        }
        self.inner.read_relation_target(relation, filter)
    }

    fn read_relation_source(
        &self,
        relation: &Relation,
        filter: ResourceFilter,
    ) -> Result<Resource> {
        if self.fail_relation_reads {
            return Err(Self::offline());
        }
        self.inner.read_relation_source(relation, filter)
    }
}

impl LockStore for FailingRepository<'_> {
    fn lock_owner(&self, id: ResourceId) -> Result<Option<UserId>> {
        self.inner.lock_owner(id)
    }

    fn blocking_locked_resources(
        &self,
        ctx: &CmsContext,
        id: ResourceId,
    ) -> Result<Vec<Resource>> {
        self.inner.blocking_locked_resources(ctx, id)
    }
}

impl PermissionStore for FailingRepository<'_> {
    fn has_direct_publish_permission(&self, ctx: &CmsContext, id: ResourceId) -> Result<bool> {
        self.inner.has_direct_publish_permission(ctx, id)
    }
}

impl ProjectStore for FailingRepository<'_> {
    fn read_project(&self, id: ProjectId) -> Result<Project> {
        self.inner.read_project(id)
    }

    fn manageable_projects(&self, ctx: &CmsContext) -> Result<Vec<Project>> {
        self.inner.manageable_projects(ctx)
    }

    fn is_manager_of(&self, ctx: &CmsContext, project: ProjectId) -> Result<bool> {
        self.inner.is_manager_of(ctx, project)
    }

    fn project_publish_list(&self, ctx: &CmsContext, project: ProjectId) -> Result<Vec<Resource>> {
        self.inner.project_publish_list(ctx, project)
    }

    fn user_publish_list(&self, ctx: &CmsContext) -> Result<Vec<Resource>> {
        self.inner.user_publish_list(ctx)
    }

    fn remove_from_user_publish_list(&self, ctx: &CmsContext, ids: &[ResourceId]) -> Result<()> {
        self.inner.remove_from_user_publish_list(ctx, ids)
    }

    fn modified_by_user(&self, ctx: &CmsContext) -> Result<Vec<Resource>> {
        self.inner.modified_by_user(ctx)
    }
}

impl Publisher for FailingRepository<'_> {
    fn publish(&self, ctx: &CmsContext, resources: &[Resource]) -> Result<Uuid> {
        self.inner.publish(ctx, resources)
    }
}
