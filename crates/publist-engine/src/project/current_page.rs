//! The page currently open in the editor.

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::{
    CmsContext, ProjectBean, ProjectId, PublishOptions, Resource, ResourceFilter, ResourceId,
};
use uuid::Uuid;

use super::VirtualProject;
use crate::TRACING_TARGET_PROJECT;
use crate::relation::RelatedResourceProvider;

/// Publishes the container page being edited, its detail content, and the
/// elements placed on it.
///
/// Parameters:
/// - `containerpage` - structure id of the page (required)
/// - `detail` - structure id of the detail content shown on the page
/// - `elements` - comma separated structure ids of the page elements
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentPageProject;

impl CurrentPageProject {
    /// Fixed project id.
    pub const ID: ProjectId =
        ProjectId::from_uuid(Uuid::from_u128(0x0193_1d4e_0c0a_7000_8000_0000_0000_0001));

    /// Parameter holding the page id.
    pub const PARAM_CONTAINER_PAGE: &str = "containerpage";
    /// Parameter holding the detail content id.
    pub const PARAM_DETAIL: &str = "detail";
    /// Parameter holding the element ids.
    pub const PARAM_ELEMENTS: &str = "elements";
}

impl VirtualProject for CurrentPageProject {
    fn project_id(&self) -> ProjectId {
        Self::ID
    }

    fn project_bean(
        &self,
        cms: &dyn CmsRepository,
        _ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Option<ProjectBean> {
        let page_id = options.id_param(Self::PARAM_CONTAINER_PAGE)?;
        let page = match cms.read_resource(page_id, ResourceFilter::All) {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET_PROJECT,
                    resource_id = %page_id,
                    error = %err,
                    "current page is not readable"
                );
                return None;
            }
        };
        Some(ProjectBean::virtual_project(
            Self::ID,
            "Current page",
            format!("Publish {} and its contents", page.root_path),
        ))
    }

    fn resources(
        &self,
        cms: &dyn CmsRepository,
        _ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Result<Vec<Resource>> {
        let Some(page_id) = options.id_param(Self::PARAM_CONTAINER_PAGE) else {
            return Ok(Vec::new());
        };

        let mut resources = vec![cms.read_resource(page_id, ResourceFilter::All)?];
        if let Some(detail_id) = options.id_param(Self::PARAM_DETAIL) {
            match cms.read_resource(detail_id, ResourceFilter::All) {
                Ok(detail) if detail.structure_id != page_id => resources.push(detail),
                Ok(_) => {}
                Err(err) => tracing::warn!(
                    target: TRACING_TARGET_PROJECT,
                    resource_id = %detail_id,
                    error = %err,
                    "skipping unreadable detail content"
                ),
            }
        }
        Ok(resources)
    }

    fn required_params(&self) -> &'static [&'static str] {
        &[Self::PARAM_CONTAINER_PAGE]
    }

    fn related_resource_provider(
        &self,
        options: &PublishOptions,
    ) -> Option<Box<dyn RelatedResourceProvider>> {
        let page = options.id_param(Self::PARAM_CONTAINER_PAGE)?;
        let elements = parse_ids(options.param(Self::PARAM_ELEMENTS));
        Some(Box::new(ElementProvider::new(page, elements)))
    }
}

fn parse_ids(value: Option<&str>) -> Vec<ResourceId> {
    value
        .into_iter()
        .flat_map(|value| value.split(','))
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

/// Relates the elements placed on a page to that page.
#[derive(Debug, Clone)]
pub struct ElementProvider {
    page: ResourceId,
    elements: Vec<ResourceId>,
}

impl ElementProvider {
    /// Creates a provider for the elements of a page.
    pub fn new(page: ResourceId, elements: Vec<ResourceId>) -> Self {
        Self { page, elements }
    }

    /// Returns the element ids.
    pub fn elements(&self) -> &[ResourceId] {
        &self.elements
    }
}

impl RelatedResourceProvider for ElementProvider {
    fn additional_related_resources(
        &self,
        cms: &dyn CmsRepository,
        resource: &Resource,
    ) -> Result<Vec<Resource>> {
        if resource.structure_id != self.page {
            return Ok(Vec::new());
        }

        let mut elements = Vec::with_capacity(self.elements.len());
        for id in &self.elements {
            match cms.read_resource(*id, ResourceFilter::All) {
                Ok(element) => elements.push(element),
                Err(err) => tracing::warn!(
                    target: TRACING_TARGET_PROJECT,
                    resource_id = %id,
                    error = %err,
                    "skipping unreadable page element"
                ),
            }
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use publist_core::types::ResourceState;

    use super::*;
    use crate::testing::Scenario;

    #[test]
    fn applies_only_with_a_page() {
        let s = Scenario::new();
        let page = s.file("/index.html", "containerpage", ResourceState::Changed);
        let project = CurrentPageProject;

        let none = PublishOptions::default();
        assert!(project.project_bean(&s.repository, &s.ctx, &none).is_none());
        assert!(project.resources(&s.repository, &s.ctx, &none).unwrap().is_empty());

        let options = PublishOptions::default()
            .with_param("containerpage", page.structure_id.to_string());
        let bean = project.project_bean(&s.repository, &s.ctx, &options).unwrap();
        assert!(bean.description.contains("/index.html"));
    }

    #[test]
    fn resources_include_detail_content() {
        let s = Scenario::new();
        let page = s.file("/index.html", "containerpage", ResourceState::Changed);
        let detail = s.file("/news/a.xml", "article", ResourceState::New);
        let options = PublishOptions::default()
            .with_param("containerpage", page.structure_id.to_string())
            .with_param("detail", detail.structure_id.to_string());

        let resources = CurrentPageProject
            .resources(&s.repository, &s.ctx, &options)
            .unwrap();
        assert_eq!(resources, vec![page, detail]);
    }

    #[test]
    fn provider_adds_elements_to_the_page_only() {
        let s = Scenario::new();
        let page = s.file("/index.html", "containerpage", ResourceState::Changed);
        let teaser = s.file("/teaser.xml", "article", ResourceState::Changed);
        let options = PublishOptions::default()
            .with_param("containerpage", page.structure_id.to_string())
            .with_param(
                "elements",
                format!("{}, not-an-id,{}", teaser.structure_id, ResourceId::new()),
            );

        let provider = CurrentPageProject
            .related_resource_provider(&options)
            .unwrap();
        assert_eq!(
            provider
                .additional_related_resources(&s.repository, &page)
                .unwrap(),
            vec![teaser.clone()]
        );
        assert!(
            provider
                .additional_related_resources(&s.repository, &teaser)
                .unwrap()
                .is_empty()
        );
    }
}
