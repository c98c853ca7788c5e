//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::repository::{
    CmsRepository, LockStore, PermissionStore, ProjectStore, Publisher, RelationStore,
    ResourceStore,
};
pub use crate::types::{
    CmsContext, InfoKind, Project, ProjectBean, ProjectId, PublishGroup, PublishOptions,
    PublishResource, PublishResourceInfo, Relation, RelationFilter, RelationType, Resource,
    ResourceFilter, ResourceId, ResourceKind, ResourceState, UserId,
};
