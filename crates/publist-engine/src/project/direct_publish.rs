//! Direct publish of an explicit file list.

use std::collections::BTreeSet;

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::{
    CmsContext, ProjectBean, ProjectId, PublishOptions, Resource, ResourceFilter,
};
use uuid::Uuid;

use super::VirtualProject;
use crate::TRACING_TARGET_PROJECT;

/// Publishes the resources named in the `files` parameter.
///
/// Paths are separated by `|`. With `add_contents=true`, the modified
/// resources below each listed folder are published as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPublishProject;

impl DirectPublishProject {
    /// Fixed project id.
    pub const ID: ProjectId =
        ProjectId::from_uuid(Uuid::from_u128(0x0193_1d4e_0c0a_7000_8000_0000_0000_0002));

    /// Parameter holding the root paths.
    pub const PARAM_FILES: &str = "files";
    /// Parameter enabling folder contents.
    pub const PARAM_ADD_CONTENTS: &str = "add_contents";

    fn paths(options: &PublishOptions) -> Vec<&str> {
        options
            .param(Self::PARAM_FILES)
            .into_iter()
            .flat_map(|files| files.split('|'))
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .collect()
    }
}

impl VirtualProject for DirectPublishProject {
    fn project_id(&self) -> ProjectId {
        Self::ID
    }

    fn project_bean(
        &self,
        _cms: &dyn CmsRepository,
        _ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Option<ProjectBean> {
        let paths = Self::paths(options);
        if paths.is_empty() {
            return None;
        }
        Some(ProjectBean::virtual_project(
            Self::ID,
            "Direct publish",
            paths.join(", "),
        ))
    }

    fn required_params(&self) -> &'static [&'static str] {
        &[Self::PARAM_FILES]
    }

    fn resources(
        &self,
        cms: &dyn CmsRepository,
        _ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Result<Vec<Resource>> {
        let add_contents = options.flag_param(Self::PARAM_ADD_CONTENTS);
        let mut seen = BTreeSet::new();
        let mut resources = Vec::new();

        for path in Self::paths(options) {
            let resource = match cms.read_resource_by_path(path, ResourceFilter::All) {
                Ok(resource) => resource,
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET_PROJECT,
                        path,
                        error = %err,
                        "skipping unreadable direct publish entry"
                    );
                    continue;
                }
            };

            let contents = if add_contents && resource.is_folder() {
                match cms.read_resources(&resource.root_path, ResourceFilter::ModifiedOnly, true) {
                    Ok(contents) => contents,
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET_PROJECT,
                            path = %resource.root_path,
                            error = %err,
                            "skipping unreadable folder contents"
                        );
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            };

            for resource in std::iter::once(resource).chain(contents) {
                if seen.insert(resource.structure_id) {
                    resources.push(resource);
                }
            }
        }

        Ok(resources)
    }
}
