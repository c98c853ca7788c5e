//! Repository ports.
//!
//! The engine never talks to storage directly. Each collaborator of the
//! publish-list computation is a small synchronous trait; [`CmsRepository`]
//! bundles them so callers can pass a single `&dyn CmsRepository`.
//!
//! Implementations are expected to enforce their own locking and versioning.
//! The engine only reads locks as data.

use uuid::Uuid;

use crate::Result;
use crate::types::{
    CmsContext, Project, ProjectId, Relation, RelationFilter, Resource, ResourceFilter,
    ResourceId, UserId,
};

/// Reads resources.
pub trait ResourceStore: Send + Sync {
    /// Reads a resource by structure id.
    fn read_resource(&self, id: ResourceId, filter: ResourceFilter) -> Result<Resource>;

    /// Reads a resource by root path.
    fn read_resource_by_path(&self, path: &str, filter: ResourceFilter) -> Result<Resource>;

    /// Reads the parent folder; `Ok(None)` for the root folder.
    fn read_parent_folder(&self, id: ResourceId) -> Result<Option<Resource>>;

    /// Reads every other resource sharing the content of `resource`.
    fn read_siblings(&self, resource: &Resource, filter: ResourceFilter) -> Result<Vec<Resource>>;

    /// Reads the resources below a folder.
    fn read_resources(
        &self,
        folder_path: &str,
        filter: ResourceFilter,
        recursive: bool,
    ) -> Result<Vec<Resource>>;

    /// Returns the login name of a user.
    fn user_name(&self, id: UserId) -> Result<String>;
}

/// Reads relations between resources.
pub trait RelationStore: Send + Sync {
    /// Returns the relations touching a resource.
    fn read_relations(&self, id: ResourceId, filter: RelationFilter) -> Result<Vec<Relation>>;

    /// Resolves the target of a relation, by id first and by path second.
    fn read_relation_target(&self, relation: &Relation, filter: ResourceFilter)
    -> Result<Resource>;

    /// Resolves the source of a relation.
    fn read_relation_source(&self, relation: &Relation, filter: ResourceFilter)
    -> Result<Resource>;
}

/// Reads locks.
pub trait LockStore: Send + Sync {
    /// Returns the owner of the lock on a resource, if it is locked.
    fn lock_owner(&self, id: ResourceId) -> Result<Option<UserId>>;

    /// Returns the resources below `id` that are locked by users other than
    /// the context user and would therefore block publishing `id`.
    fn blocking_locked_resources(&self, ctx: &CmsContext, id: ResourceId)
    -> Result<Vec<Resource>>;
}

/// Checks permissions.
pub trait PermissionStore: Send + Sync {
    /// Returns whether the context user has the direct-publish permission.
    fn has_direct_publish_permission(&self, ctx: &CmsContext, id: ResourceId) -> Result<bool>;
}

/// Reads projects and publish lists.
pub trait ProjectStore: Send + Sync {
    /// Reads a project.
    fn read_project(&self, id: ProjectId) -> Result<Project>;

    /// Returns the projects the context user may manage.
    fn manageable_projects(&self, ctx: &CmsContext) -> Result<Vec<Project>>;

    /// Returns whether the context user manages a project.
    fn is_manager_of(&self, ctx: &CmsContext, project: ProjectId) -> Result<bool>;

    /// Returns the standing publish list of a project.
    fn project_publish_list(&self, ctx: &CmsContext, project: ProjectId) -> Result<Vec<Resource>>;

    /// Returns the context user's personal publish list.
    fn user_publish_list(&self, ctx: &CmsContext) -> Result<Vec<Resource>>;

    /// Removes resources from the context user's publish list.
    fn remove_from_user_publish_list(&self, ctx: &CmsContext, ids: &[ResourceId]) -> Result<()>;

    /// Returns the modified resources last changed by the context user.
    fn modified_by_user(&self, ctx: &CmsContext) -> Result<Vec<Resource>>;
}

/// Hands a final publish list to the publish engine.
pub trait Publisher: Send + Sync {
    /// Starts a publish job and returns its id.
    fn publish(&self, ctx: &CmsContext, resources: &[Resource]) -> Result<Uuid>;
}

/// Every port the publish-list engine needs.
pub trait CmsRepository:
    ResourceStore + RelationStore + LockStore + PermissionStore + ProjectStore + Publisher
{
}

impl<T> CmsRepository for T where
    T: ResourceStore + RelationStore + LockStore + PermissionStore + ProjectStore + Publisher
{
}
