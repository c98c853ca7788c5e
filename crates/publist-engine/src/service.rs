//! Publish dialog entry points.

use std::collections::BTreeMap;
use std::sync::Arc;

use jiff::Timestamp;
use publist_core::repository::CmsRepository;
use publist_core::types::{
    CmsContext, InfoKind, ProjectBean, PublishOptions, PublishResource, PublishResourceInfo,
    Resource, ResourceFilter, ResourceId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::VirtualProjectRegistry;
use crate::publish::{BeanFactory, Exclusions, PublishList, PublishListAssembler};
use crate::relation::RelatedResources;
use crate::session::SessionOptionsStore;
use crate::validate::{BrokenLink, LinkValidator};
use crate::{PublishConfig, PublishResult, TRACING_TARGET_SERVICE};

/// Outcome of a publish request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WorkflowResponse {
    /// The resources were handed to the publish engine.
    Published {
        /// Publish job id.
        job_id: Uuid,
        /// Number of published resources.
        resources: usize,
    },
    /// Nothing was published.
    Rejected {
        /// Requested ids that could not be read.
        missing: Vec<ResourceId>,
        /// Resources that may not be published.
        blocked: Vec<PublishResource>,
        /// Resources whose links would break, with the link targets as
        /// related entries.
        broken_links: Vec<PublishResource>,
    },
}

impl WorkflowResponse {
    /// Returns whether the resources were published.
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Facade over the publish-list engine for one repository.
///
/// All operations are synchronous and run to completion on the calling
/// thread.
pub struct PublishService {
    cms: Arc<dyn CmsRepository>,
    config: PublishConfig,
    registry: VirtualProjectRegistry,
    sessions: SessionOptionsStore,
}

impl PublishService {
    /// Creates a service with the built-in virtual projects.
    pub fn new(cms: Arc<dyn CmsRepository>, config: PublishConfig) -> PublishResult<Self> {
        Self::with_registry(cms, config, VirtualProjectRegistry::with_defaults())
    }

    /// Creates a service with a custom virtual project registry.
    pub fn with_registry(
        cms: Arc<dyn CmsRepository>,
        config: PublishConfig,
        registry: VirtualProjectRegistry,
    ) -> PublishResult<Self> {
        config.validate()?;
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            related_mode = %config.related_mode,
            virtual_projects = registry.len(),
            "publish service created"
        );
        Ok(Self {
            cms,
            config,
            registry,
            sessions: SessionOptionsStore::new(),
        })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Returns the virtual project registry.
    pub fn registry(&self) -> &VirtualProjectRegistry {
        &self.registry
    }

    /// Returns the options the session last used, or the defaults.
    pub fn initial_options(&self, ctx: &CmsContext) -> PublishOptions {
        self.sessions.get_or_default(ctx)
    }

    /// Returns the projects the user can choose from: manageable real
    /// projects first, then the virtual projects that apply.
    pub fn projects(
        &self,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> PublishResult<Vec<ProjectBean>> {
        let mut beans: Vec<ProjectBean> = self
            .cms
            .manageable_projects(ctx)?
            .iter()
            .map(ProjectBean::from)
            .collect();
        beans.extend(self.registry.project_beans(self.cms.as_ref(), ctx, options));
        Ok(beans)
    }

    /// Builds the grouped publish list and remembers the options for the
    /// session.
    pub fn publish_list(
        &self,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> PublishResult<PublishList> {
        self.publish_list_at(ctx, options, Timestamp::now())
    }

    /// Builds the grouped publish list relative to `now`.
    pub fn publish_list_at(
        &self,
        ctx: &CmsContext,
        options: &PublishOptions,
        now: Timestamp,
    ) -> PublishResult<PublishList> {
        self.sessions.save(ctx, options);
        let list = self.assembler(ctx, options).publish_list_at(now)?;
        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            user = %ctx.user_name,
            groups = list.groups.len(),
            resources = list.resource_count(),
            too_many_resources = list.too_many_resources,
            "publish list computed"
        );
        Ok(list)
    }

    /// Returns the related resources the publish list would carry.
    pub fn related_resources(
        &self,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> PublishResult<RelatedResources> {
        let assembler = self.assembler(ctx, options);
        let mut resources = assembler.raw_resources()?;
        if options.include_siblings {
            resources = assembler.add_siblings(resources);
        }
        Ok(assembler.related_resources(resources))
    }

    /// Returns the links that publishing the given resources would break.
    ///
    /// Each entry is the resource holding the link, annotated as a broken
    /// link, with the link targets as related entries.
    pub fn validate(
        &self,
        ctx: &CmsContext,
        ids: &[ResourceId],
    ) -> PublishResult<Vec<PublishResource>> {
        let (resources, _) = self.read_all(ids);
        let broken = LinkValidator::new(self.cms.as_ref()).validate(&resources);
        Ok(self.broken_link_beans(ctx, broken))
    }

    /// Publishes the given resources.
    ///
    /// Unreadable ids and resources that may not be published reject the
    /// request. Broken links reject it too unless `force` is set.
    pub fn publish(
        &self,
        ctx: &CmsContext,
        ids: &[ResourceId],
        force: bool,
    ) -> PublishResult<WorkflowResponse> {
        let (resources, missing) = self.read_all(ids);

        let exclusions = Exclusions::compute(self.cms.as_ref(), ctx, &resources);
        let mut factory = BeanFactory::new(self.cms.as_ref(), ctx);
        let blocked: Vec<PublishResource> = resources
            .iter()
            .filter_map(|resource| {
                let info = exclusions.info(&resource.structure_id)?;
                Some(factory.bean(resource, Some(info)))
            })
            .collect();

        let broken_links = if force {
            Vec::new()
        } else {
            let broken = LinkValidator::new(self.cms.as_ref()).validate(&resources);
            self.broken_link_beans(ctx, broken)
        };

        if !missing.is_empty() || !blocked.is_empty() || !broken_links.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_SERVICE,
                user = %ctx.user_name,
                missing = missing.len(),
                blocked = blocked.len(),
                broken_links = broken_links.len(),
                "publish rejected"
            );
            return Ok(WorkflowResponse::Rejected {
                missing,
                blocked,
                broken_links,
            });
        }

        let job_id = self.cms.publish(ctx, &resources)?;
        Ok(WorkflowResponse::Published {
            job_id,
            resources: resources.len(),
        })
    }

    /// Removes resources from the user's publish list.
    pub fn remove_resources(&self, ctx: &CmsContext, ids: &[ResourceId]) -> PublishResult<()> {
        self.cms.remove_from_user_publish_list(ctx, ids)?;
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            user = %ctx.user_name,
            removed = ids.len(),
            "removed resources from publish list"
        );
        Ok(())
    }

    fn assembler<'s>(
        &'s self,
        ctx: &'s CmsContext,
        options: &'s PublishOptions,
    ) -> PublishListAssembler<'s> {
        PublishListAssembler::new(self.cms.as_ref(), ctx, &self.config, &self.registry, options)
    }

    fn read_all(&self, ids: &[ResourceId]) -> (Vec<Resource>, Vec<ResourceId>) {
        let mut resources = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match self.cms.read_resource(*id, ResourceFilter::All) {
                Ok(resource) => resources.push(resource),
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET_SERVICE,
                        resource_id = %id,
                        error = %err,
                        "requested resource is missing"
                    );
                    missing.push(*id);
                }
            }
        }
        (resources, missing)
    }

    fn broken_link_beans(
        &self,
        ctx: &CmsContext,
        broken: Vec<BrokenLink>,
    ) -> Vec<PublishResource> {
        let mut by_source: BTreeMap<ResourceId, (Resource, Vec<BrokenLink>)> = BTreeMap::new();
        for link in broken {
            by_source
                .entry(link.source.structure_id)
                .or_insert_with(|| (link.source.clone(), Vec::new()))
                .1
                .push(link);
        }

        let mut factory = BeanFactory::new(self.cms.as_ref(), ctx);
        by_source
            .into_values()
            .map(|(source, links)| {
                let info = PublishResourceInfo::new(
                    InfoKind::BrokenLink,
                    "Publishing would break links of this resource",
                );
                let mut bean = factory.bean(&source, Some(info));
                for link in links {
                    let info =
                        PublishResourceInfo::new(InfoKind::BrokenLink, link.kind.description());
                    bean.related.push(factory.bean(&link.target, Some(info)));
                }
                bean
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use publist_core::memory::MemoryRepository;
    use publist_core::types::{RelationType, ResourceState};

    use super::*;
    use crate::project::MyChangesProject;
    use crate::testing::Scenario;

    fn service(mut s: Scenario) -> (PublishService, Arc<MemoryRepository>, Scenario) {
        let repository = Arc::new(std::mem::take(&mut s.repository));
        let service = PublishService::new(repository.clone(), s.config()).unwrap();
        (service, repository, s)
    }

    #[test]
    fn publish_list_remembers_session_options() {
        let s = Scenario::new();
        let ctx = s.ctx.clone().with_session("session-1");
        s.file("/a.html", "plain", ResourceState::Changed);
        let (service, _, s) = service(s);

        let options = PublishOptions::default().with_project(s.project);
        let list = service.publish_list_at(&ctx, &options, s.now).unwrap();
        assert_eq!(list.resource_count(), 1);
        assert_eq!(service.initial_options(&ctx), options);
    }

    #[test]
    fn projects_list_real_then_virtual() {
        let (service, _, s) = service(Scenario::new());
        let beans = service.projects(&s.ctx, &PublishOptions::default()).unwrap();
        let names: Vec<&str> = beans.iter().map(|bean| bean.name.as_str()).collect();
        assert_eq!(names, vec!["Offline", "My changes"]);
        assert_eq!(beans[1].id, MyChangesProject::ID);
    }

    #[test]
    fn publish_hands_resources_to_the_publisher() {
        let s = Scenario::new();
        let a = s.file("/a.html", "plain", ResourceState::Changed);
        s.repository.add_to_publish_list(s.ctx.user_id, a.structure_id);
        let (service, repository, s) = service(s);

        let response = service.publish(&s.ctx, &[a.structure_id], false).unwrap();
        let WorkflowResponse::Published { job_id, resources } = response else {
            panic!("expected publish, got {response:?}");
        };
        assert_eq!(resources, 1);
        assert_eq!(repository.published_job(job_id), Some(vec![a.structure_id]));
        let list = service
            .publish_list(&s.ctx, &PublishOptions::default())
            .unwrap();
        assert!(list.groups.is_empty());
    }

    #[test]
    fn publish_rejects_missing_and_blocked() {
        let s = Scenario::new();
        let locked = s.file("/locked.html", "plain", ResourceState::Changed);
        s.repository.lock(locked.structure_id, s.other);
        let (service, _, s) = service(s);

        let ghost = ResourceId::new();
        let response = service
            .publish(&s.ctx, &[locked.structure_id, ghost], true)
            .unwrap();
        let WorkflowResponse::Rejected {
            missing, blocked, ..
        } = response
        else {
            panic!("expected rejection, got {response:?}");
        };
        assert_eq!(missing, vec![ghost]);
        assert_eq!(blocked.len(), 1);
        assert_eq!(
            blocked[0].info.as_ref().map(|info| info.kind),
            Some(InfoKind::Locked)
        );
    }

    #[test]
    fn broken_links_reject_unless_forced() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let article = s.file("/article.xml", "article", ResourceState::New);
        s.relate(&page, &article, RelationType::XmlStrong);
        let (service, _, s) = service(s);

        let broken = service.validate(&s.ctx, &[page.structure_id]).unwrap();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].id, page.structure_id);
        assert_eq!(broken[0].related[0].id, article.structure_id);

        let response = service.publish(&s.ctx, &[page.structure_id], false).unwrap();
        assert!(!response.is_published());
        let response = service.publish(&s.ctx, &[page.structure_id], true).unwrap();
        assert!(response.is_published());
    }

    #[test]
    fn workflow_response_fields_are_camel_case() {
        let job_id = Uuid::now_v7();
        let published = serde_json::to_value(WorkflowResponse::Published {
            job_id,
            resources: 2,
        })
        .unwrap();
        assert_eq!(published["status"], "published");
        assert_eq!(published["jobId"], job_id.to_string());

        let rejected = serde_json::to_value(WorkflowResponse::Rejected {
            missing: Vec::new(),
            blocked: Vec::new(),
            broken_links: Vec::new(),
        })
        .unwrap();
        assert_eq!(rejected["status"], "rejected");
        assert!(rejected["brokenLinks"].as_array().unwrap().is_empty());
        assert!(rejected.get("broken_links").is_none());
    }

    #[test]
    fn remove_resources_updates_the_user_list() {
        let s = Scenario::new();
        let a = s.file("/a.html", "plain", ResourceState::Changed);
        let b = s.file("/b.html", "plain", ResourceState::Changed);
        s.repository.add_to_publish_list(s.ctx.user_id, a.structure_id);
        s.repository.add_to_publish_list(s.ctx.user_id, b.structure_id);
        let (service, _, s) = service(s);

        service.remove_resources(&s.ctx, &[a.structure_id]).unwrap();
        let options = PublishOptions::default().with_related(false);
        let list = service.publish_list_at(&s.ctx, &options, s.now).unwrap();
        let ids: Vec<ResourceId> = list.resources().map(|bean| bean.id).collect();
        assert_eq!(ids, vec![b.structure_id]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PublishConfig {
            young_days: 30,
            ..PublishConfig::default()
        };
        let result = PublishService::new(Arc::new(MemoryRepository::new()), config);
        assert!(result.is_err());
    }
}
