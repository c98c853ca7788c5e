//! Domain types for the publish-list engine.
//!
//! Repository-facing types ([`Resource`], [`Relation`], [`Project`]) mirror
//! what a content repository stores. Client-facing types ([`PublishResource`],
//! [`PublishGroup`], [`ProjectBean`]) are the serializable projections a
//! publish dialog renders.

mod bean;
mod context;
mod id;
mod options;
mod project;
mod relation;
mod resource;

pub use bean::{InfoKind, PublishGroup, PublishResource, PublishResourceInfo};
pub use context::CmsContext;
pub use id::{ProjectId, ResourceId, UserId};
pub use options::{PublishOptions, PublishParams};
pub use project::{Project, ProjectBean};
pub use relation::{Relation, RelationDirection, RelationFilter, RelationStrength, RelationType};
pub use resource::{Resource, ResourceFilter, ResourceKind, ResourceState};
