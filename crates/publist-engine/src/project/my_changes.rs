//! The user's own pending changes.

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::{CmsContext, ProjectBean, ProjectId, PublishOptions, Resource};
use uuid::Uuid;

use super::VirtualProject;

/// Publishes every modified resource the current user changed last.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyChangesProject;

impl MyChangesProject {
    /// Fixed project id.
    pub const ID: ProjectId =
        ProjectId::from_uuid(Uuid::from_u128(0x0193_1d4e_0c0a_7000_8000_0000_0000_0003));
}

impl VirtualProject for MyChangesProject {
    fn project_id(&self) -> ProjectId {
        Self::ID
    }

    fn project_bean(
        &self,
        _cms: &dyn CmsRepository,
        ctx: &CmsContext,
        _options: &PublishOptions,
    ) -> Option<ProjectBean> {
        Some(ProjectBean::virtual_project(
            Self::ID,
            "My changes",
            format!("All resources last changed by {}", ctx.user_name),
        ))
    }

    fn resources(
        &self,
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        _options: &PublishOptions,
    ) -> Result<Vec<Resource>> {
        cms.modified_by_user(ctx)
    }
}
