//! Convenient re-exports for common use.

pub use publist_core::prelude::*;

pub use crate::group::{AgeBand, GroupLabel, GroupPartitioner, Grouping};
pub use crate::project::{
    CurrentPageProject, DirectPublishProject, MyChangesProject, RealProjectWrapper,
    VirtualProject, VirtualProjectRegistry,
};
pub use crate::publish::{Exclusions, PublishList, PublishListAssembler};
pub use crate::relation::{RelatedResourceProvider, RelatedResources, RelationFinder, ResourceMap};
pub use crate::service::{PublishService, WorkflowResponse};
pub use crate::session::SessionOptionsStore;
pub use crate::validate::{BrokenLink, BrokenLinkKind, LinkValidator};
pub use crate::{PublishConfig, PublishError, PublishResult, RelatedMode};
