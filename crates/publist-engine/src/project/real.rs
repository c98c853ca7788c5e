//! Persisted projects behind the virtual project interface.

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::{CmsContext, ProjectBean, ProjectId, PublishOptions, Resource};

use super::VirtualProject;
use crate::TRACING_TARGET_PROJECT;

/// Adapts a real project so the assembler can treat every project alike.
///
/// Wrappers are created on demand for ids that no virtual handler claims and
/// are never registered.
#[derive(Debug, Clone, Copy)]
pub struct RealProjectWrapper {
    project_id: ProjectId,
}

impl RealProjectWrapper {
    /// Wraps the project with the given id.
    pub fn new(project_id: ProjectId) -> Self {
        Self { project_id }
    }
}

impl VirtualProject for RealProjectWrapper {
    fn project_id(&self) -> ProjectId {
        self.project_id
    }

    fn project_bean(
        &self,
        cms: &dyn CmsRepository,
        _ctx: &CmsContext,
        _options: &PublishOptions,
    ) -> Option<ProjectBean> {
        match cms.read_project(self.project_id) {
            Ok(project) => Some(ProjectBean::from(&project)),
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET_PROJECT,
                    project_id = %self.project_id,
                    error = %err,
                    "project is not readable"
                );
                None
            }
        }
    }

    fn resources(
        &self,
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        _options: &PublishOptions,
    ) -> Result<Vec<Resource>> {
        cms.project_publish_list(ctx, self.project_id)
    }
}
