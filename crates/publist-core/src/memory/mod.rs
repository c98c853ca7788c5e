//! Snapshot-backed in-memory repository.
//!
//! [`MemoryRepository`] implements every repository port over plain maps. It
//! loads from a [`RepositorySnapshot`] and can be mutated through `&self`, so a
//! single instance can be shared by reference between a service and its tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use publist_core::memory::{MemoryRepository, RepositorySnapshot};
//!
//! let snapshot = RepositorySnapshot::from_path("repository.json")?;
//! let repository = MemoryRepository::from_snapshot(snapshot);
//! ```

mod snapshot;

use std::collections::BTreeSet;

use dashmap::{DashMap, DashSet};
use uuid::Uuid;

pub use self::snapshot::{
    LockRecord, PermissionDenial, PublishListRecord, RepositorySnapshot, UserRecord,
};
use crate::repository::{
    LockStore, PermissionStore, ProjectStore, Publisher, RelationStore, ResourceStore,
};
use crate::types::{
    CmsContext, Project, ProjectId, Relation, RelationDirection, RelationFilter, Resource,
    ResourceFilter, ResourceId, ResourceState, UserId,
};
use crate::{Error, Result, TRACING_TARGET_REPOSITORY};

/// In-memory implementation of all repository ports.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: DashMap<UserId, String>,
    projects: DashMap<ProjectId, Project>,
    resources: DashMap<ResourceId, Resource>,
    relations: DashMap<ResourceId, Vec<Relation>>,
    locks: DashMap<ResourceId, UserId>,
    denials: DashSet<(UserId, ResourceId)>,
    publish_lists: DashMap<UserId, Vec<ResourceId>>,
    jobs: DashMap<Uuid, Vec<ResourceId>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the contents of a snapshot.
    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        let repository = Self::new();
        for user in snapshot.users {
            repository.insert_user(user.id, user.name);
        }
        for project in snapshot.projects {
            repository.insert_project(project);
        }
        for resource in snapshot.resources {
            repository.insert_resource(resource);
        }
        for relation in snapshot.relations {
            repository.add_relation(relation);
        }
        for lock in snapshot.locks {
            repository.lock(lock.resource_id, lock.owner);
        }
        for denial in snapshot.permission_denials {
            repository.deny_publish(denial.user_id, denial.resource_id);
        }
        for list in snapshot.publish_lists {
            for id in list.resources {
                repository.add_to_publish_list(list.user_id, id);
            }
        }

        tracing::debug!(
            target: TRACING_TARGET_REPOSITORY,
            resources = repository.resources.len(),
            projects = repository.projects.len(),
            "loaded repository snapshot"
        );
        repository
    }

    /// Adds a user.
    pub fn insert_user(&self, id: UserId, name: impl Into<String>) {
        self.users.insert(id, name.into());
    }

    /// Adds or replaces a project.
    pub fn insert_project(&self, project: Project) {
        self.projects.insert(project.id, project);
    }

    /// Adds or replaces a resource.
    pub fn insert_resource(&self, resource: Resource) {
        self.resources.insert(resource.structure_id, resource);
    }

    /// Adds a relation.
    pub fn add_relation(&self, relation: Relation) {
        self.relations
            .entry(relation.source_id)
            .or_default()
            .push(relation);
    }

    /// Locks a resource for a user.
    pub fn lock(&self, id: ResourceId, owner: UserId) {
        self.locks.insert(id, owner);
    }

    /// Removes the direct-publish permission of a user on a resource subtree.
    pub fn deny_publish(&self, user: UserId, id: ResourceId) {
        self.denials.insert((user, id));
    }

    /// Appends a resource to a user's publish list.
    pub fn add_to_publish_list(&self, user: UserId, id: ResourceId) {
        let mut list = self.publish_lists.entry(user).or_default();
        if !list.contains(&id) {
            list.push(id);
        }
    }

    /// Returns the resources handed to the publish engine by a job.
    pub fn published_job(&self, job: Uuid) -> Option<Vec<ResourceId>> {
        self.jobs.get(&job).map(|entry| entry.value().clone())
    }

    fn find(&self, id: ResourceId) -> Option<Resource> {
        self.resources.get(&id).map(|entry| entry.value().clone())
    }

    fn find_by_path(&self, path: &str) -> Option<Resource> {
        self.resources
            .iter()
            .find(|entry| entry.root_path == path)
            .map(|entry| entry.value().clone())
    }

    fn filtered(
        resource: Option<Resource>,
        filter: ResourceFilter,
        context: String,
    ) -> Result<Resource> {
        resource
            .filter(|resource| filter.accepts(resource.state))
            .ok_or_else(|| {
                Error::not_found()
                    .with_message("resource not found")
                    .with_context(context)
            })
    }

    fn collect_sorted(&self, predicate: impl Fn(&Resource) -> bool) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self
            .resources
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        resources.sort_by(|a, b| a.root_path.cmp(&b.root_path));
        resources
    }

    fn ancestors_and_self(&self, resource: &Resource) -> Vec<ResourceId> {
        let mut ids = vec![resource.structure_id];
        let mut current = resource.parent_path().map(str::to_owned);
        while let Some(path) = current {
            match self.find_by_path(&path) {
                Some(parent) => {
                    ids.push(parent.structure_id);
                    current = parent.parent_path().map(str::to_owned);
                }
                None => break,
            }
        }
        ids
    }
}

impl ResourceStore for MemoryRepository {
    fn read_resource(&self, id: ResourceId, filter: ResourceFilter) -> Result<Resource> {
        Self::filtered(self.find(id), filter, format!("id: {id}"))
    }

    fn read_resource_by_path(&self, path: &str, filter: ResourceFilter) -> Result<Resource> {
        Self::filtered(self.find_by_path(path), filter, format!("path: {path}"))
    }

    fn read_parent_folder(&self, id: ResourceId) -> Result<Option<Resource>> {
        let resource = self.read_resource(id, ResourceFilter::All)?;
        match resource.parent_path() {
            Some(path) => self.read_resource_by_path(path, ResourceFilter::All).map(Some),
            None => Ok(None),
        }
    }

    fn read_siblings(&self, resource: &Resource, filter: ResourceFilter) -> Result<Vec<Resource>> {
        let content_id = resource.content_id();
        Ok(self.collect_sorted(|candidate| {
            candidate.structure_id != resource.structure_id
                && candidate.content_id() == content_id
                && filter.accepts(candidate.state)
        }))
    }

    fn read_resources(
        &self,
        folder_path: &str,
        filter: ResourceFilter,
        recursive: bool,
    ) -> Result<Vec<Resource>> {
        let prefix = if folder_path.ends_with('/') {
            folder_path.to_owned()
        } else {
            format!("{folder_path}/")
        };

        Ok(self.collect_sorted(|candidate| {
            let Some(rest) = candidate.root_path.strip_prefix(&prefix) else {
                return false;
            };
            if rest.is_empty() || !filter.accepts(candidate.state) {
                return false;
            }
            recursive || !rest.trim_end_matches('/').contains('/')
        }))
    }

    fn user_name(&self, id: UserId) -> Result<String> {
        self.users
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::not_found()
                    .with_message("user not found")
                    .with_context(format!("id: {id}"))
            })
    }
}

impl RelationStore for MemoryRepository {
    fn read_relations(&self, id: ResourceId, filter: RelationFilter) -> Result<Vec<Relation>> {
        let relations = match filter.direction {
            RelationDirection::Outgoing => self
                .relations
                .get(&id)
                .map(|entry| entry.value().clone())
                .unwrap_or_default(),
            RelationDirection::Incoming => {
                let path = self.find(id).map(|resource| resource.root_path);
                let mut incoming: Vec<Relation> = self
                    .relations
                    .iter()
                    .flat_map(|entry| entry.value().clone())
                    .filter(|relation| match relation.target_id {
                        Some(target) => target == id,
                        None => path.as_deref() == Some(relation.target_path.as_str()),
                    })
                    .collect();
                incoming.sort_by(|a, b| a.source_id.cmp(&b.source_id));
                incoming
            }
        };

        Ok(relations
            .into_iter()
            .filter(|relation| filter.accepts(relation.relation_type))
            .collect())
    }

    fn read_relation_target(
        &self,
        relation: &Relation,
        filter: ResourceFilter,
    ) -> Result<Resource> {
        let target = relation
            .target_id
            .and_then(|id| self.find(id))
            .or_else(|| self.find_by_path(&relation.target_path));
        Self::filtered(target, filter, format!("path: {}", relation.target_path))
    }

    fn read_relation_source(
        &self,
        relation: &Relation,
        filter: ResourceFilter,
    ) -> Result<Resource> {
        self.read_resource(relation.source_id, filter)
    }
}

impl LockStore for MemoryRepository {
    fn lock_owner(&self, id: ResourceId) -> Result<Option<UserId>> {
        Ok(self.locks.get(&id).map(|entry| *entry.value()))
    }

    fn blocking_locked_resources(
        &self,
        ctx: &CmsContext,
        id: ResourceId,
    ) -> Result<Vec<Resource>> {
        let resource = self.read_resource(id, ResourceFilter::All)?;
        if !resource.is_folder() {
            return Ok(Vec::new());
        }

        let below = self.read_resources(&resource.root_path, ResourceFilter::All, true)?;
        Ok(below
            .into_iter()
            .filter(|candidate| {
                self.locks
                    .get(&candidate.structure_id)
                    .is_some_and(|owner| *owner != ctx.user_id)
            })
            .collect())
    }
}

impl PermissionStore for MemoryRepository {
    fn has_direct_publish_permission(&self, ctx: &CmsContext, id: ResourceId) -> Result<bool> {
        let resource = self.read_resource(id, ResourceFilter::All)?;
        let denied = self
            .ancestors_and_self(&resource)
            .into_iter()
            .any(|candidate| self.denials.contains(&(ctx.user_id, candidate)));
        Ok(!denied)
    }
}

impl ProjectStore for MemoryRepository {
    fn read_project(&self, id: ProjectId) -> Result<Project> {
        self.projects
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::not_found()
                    .with_message("project not found")
                    .with_context(format!("id: {id}"))
            })
    }

    fn manageable_projects(&self, ctx: &CmsContext) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|entry| entry.managers.contains(&ctx.user_id))
            .map(|entry| entry.value().clone())
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    fn is_manager_of(&self, ctx: &CmsContext, project: ProjectId) -> Result<bool> {
        Ok(self.read_project(project)?.managers.contains(&ctx.user_id))
    }

    fn project_publish_list(&self, _ctx: &CmsContext, project: ProjectId) -> Result<Vec<Resource>> {
        self.read_project(project)?;
        Ok(self.collect_sorted(|resource| {
            resource.project_last_modified == project && !resource.state.is_unchanged()
        }))
    }

    fn user_publish_list(&self, ctx: &CmsContext) -> Result<Vec<Resource>> {
        let ids = self
            .publish_lists
            .get(&ctx.user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut resources = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find(id) {
                Some(resource) => resources.push(resource),
                None => tracing::warn!(
                    target: TRACING_TARGET_REPOSITORY,
                    resource_id = %id,
                    "publish list entry points to a missing resource"
                ),
            }
        }
        Ok(resources)
    }

    fn remove_from_user_publish_list(&self, ctx: &CmsContext, ids: &[ResourceId]) -> Result<()> {
        if let Some(mut list) = self.publish_lists.get_mut(&ctx.user_id) {
            list.retain(|id| !ids.contains(id));
        }
        Ok(())
    }

    fn modified_by_user(&self, ctx: &CmsContext) -> Result<Vec<Resource>> {
        Ok(self.collect_sorted(|resource| {
            resource.user_last_modified == ctx.user_id && !resource.state.is_unchanged()
        }))
    }
}

impl Publisher for MemoryRepository {
    fn publish(&self, ctx: &CmsContext, resources: &[Resource]) -> Result<Uuid> {
        let job = Uuid::now_v7();
        let ids: BTreeSet<ResourceId> = resources.iter().map(|r| r.structure_id).collect();

        for id in &ids {
            let deleted = self
                .resources
                .get(id)
                .is_some_and(|entry| entry.state.is_deleted());
            if deleted {
                self.resources.remove(id);
                self.relations.remove(id);
                self.locks.remove(id);
            } else if let Some(mut entry) = self.resources.get_mut(id) {
                entry.state = ResourceState::Unchanged;
            }
        }

        for mut list in self.publish_lists.iter_mut() {
            list.retain(|id| !ids.contains(id));
        }
        self.jobs.insert(job, ids.into_iter().collect());

        tracing::info!(
            target: TRACING_TARGET_REPOSITORY,
            job_id = %job,
            user = %ctx.user_name,
            resources = resources.len(),
            "publish job started"
        );
        Ok(job)
    }
}
