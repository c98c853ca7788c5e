use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use publist_core::repository::CmsRepository;
use publist_core::types::{
    CmsContext, InfoKind, PublishGroup, PublishOptions, PublishResource, PublishResourceInfo,
    RelationFilter, Resource, ResourceFilter, ResourceId, UserId,
};
use serde::{Deserialize, Serialize};

use super::Exclusions;
use crate::group::{GroupPartitioner, Grouping};
use crate::project::{RealProjectWrapper, VirtualProject, VirtualProjectRegistry};
use crate::relation::{RelatedResourceProvider, RelatedResources, RelationFinder};
use crate::{PublishConfig, PublishError, PublishResult, RelatedMode, TRACING_TARGET_PUBLISH};

/// Name of the group used when the list is too long to partition.
pub const ALL_RESOURCES_GROUP: &str = "All resources";

/// Grouped publish list returned to the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishList {
    /// Recency groups.
    pub groups: Vec<PublishGroup>,
    /// Whether the list exceeded the resource limit and was not partitioned.
    #[serde(default)]
    pub too_many_resources: bool,
}

impl PublishList {
    /// Returns the number of top-level resources over all groups.
    pub fn resource_count(&self) -> usize {
        self.groups.iter().map(|group| group.resources.len()).sum()
    }

    /// Iterates over the top-level resources of all groups.
    pub fn resources(&self) -> impl Iterator<Item = &PublishResource> {
        self.groups.iter().flat_map(|group| group.resources.iter())
    }
}

/// Builds the publish list for one request.
///
/// The list is assembled in fixed steps: read the raw resources of the
/// selected project, add modified siblings, expand related resources, compute
/// exclusions, convert to beans and drop temporary files.
pub struct PublishListAssembler<'a> {
    cms: &'a dyn CmsRepository,
    ctx: &'a CmsContext,
    config: &'a PublishConfig,
    registry: &'a VirtualProjectRegistry,
    options: &'a PublishOptions,
}

impl<'a> PublishListAssembler<'a> {
    /// Creates an assembler for one request.
    pub fn new(
        cms: &'a dyn CmsRepository,
        ctx: &'a CmsContext,
        config: &'a PublishConfig,
        registry: &'a VirtualProjectRegistry,
        options: &'a PublishOptions,
    ) -> Self {
        Self {
            cms,
            ctx,
            config,
            registry,
            options,
        }
    }

    /// Reads the resources of the selected project.
    ///
    /// Without a project this is the user's publish list; registered virtual
    /// ids delegate to their handler; anything else is a real project.
    pub fn raw_resources(&self) -> PublishResult<Vec<Resource>> {
        if self.options.uses_user_publish_list() {
            return Ok(self.cms.user_publish_list(self.ctx)?);
        }

        let Some(project_id) = self.options.project_id else {
            return Ok(Vec::new());
        };
        if let Some(handler) = self.registry.get(project_id) {
            if let Some(missing) = handler
                .required_params()
                .iter()
                .find(|name| self.options.param(name).is_none())
            {
                return Err(PublishError::InvalidOptions(format!(
                    "project {project_id} requires the '{missing}' parameter"
                )));
            }
            return Ok(handler.resources(self.cms, self.ctx, self.options)?);
        }

        RealProjectWrapper::new(project_id)
            .resources(self.cms, self.ctx, self.options)
            .map_err(|err| {
                if err.is_not_found() {
                    PublishError::ProjectNotFound(project_id)
                } else {
                    PublishError::Repository(err)
                }
            })
    }

    /// Appends the modified siblings of every modified resource.
    pub fn add_siblings(&self, resources: Vec<Resource>) -> Vec<Resource> {
        let mut seen: BTreeSet<ResourceId> = resources.iter().map(|r| r.structure_id).collect();
        let mut siblings = Vec::new();

        for resource in resources.iter().filter(|r| !r.state.is_unchanged()) {
            match self.cms.read_siblings(resource, ResourceFilter::ModifiedOnly) {
                Ok(found) => siblings.extend(
                    found
                        .into_iter()
                        .filter(|sibling| seen.insert(sibling.structure_id)),
                ),
                Err(err) => tracing::warn!(
                    target: TRACING_TARGET_PUBLISH,
                    resource_id = %resource.structure_id,
                    error = %err,
                    "failed to read siblings"
                ),
            }
        }

        resources.into_iter().chain(siblings).collect()
    }

    /// Expands the related resources according to the configured mode.
    pub fn related_resources(&self, resources: Vec<Resource>) -> RelatedResources {
        if !self.options.include_related {
            return RelatedResources::without_relations(resources);
        }

        match self.config.related_mode {
            RelatedMode::Direct => self.direct_related(resources),
            RelatedMode::Transitive => {
                let provider = self.provider();
                RelationFinder::new(
                    self.cms,
                    self.config,
                    resources,
                    self.options.uses_user_publish_list(),
                )
                .with_provider(provider.as_deref())
                .publish_related_resources()
            }
        }
    }

    /// Builds the annotated beans of the publish list.
    pub fn publish_resources(&self) -> PublishResult<Vec<PublishResource>> {
        let mut resources = self.raw_resources()?;
        if self.options.include_siblings {
            resources = self.add_siblings(resources);
        }

        let mut related = self.related_resources(resources);
        related.retain(|resource| !resource.is_temporary());

        let exclusions = Exclusions::compute(self.cms, self.ctx, related.all_resources());
        let beans = BeanFactory::new(self.cms, self.ctx).build(&related, &exclusions);

        tracing::debug!(
            target: TRACING_TARGET_PUBLISH,
            user = %self.ctx.user_name,
            resources = beans.len(),
            excluded = exclusions.len(),
            "assembled publish list"
        );
        Ok(beans)
    }

    /// Builds the grouped publish list.
    pub fn publish_list(&self) -> PublishResult<PublishList> {
        self.publish_list_at(Timestamp::now())
    }

    /// Builds the grouped publish list relative to `now`.
    pub fn publish_list_at(&self, now: Timestamp) -> PublishResult<PublishList> {
        let beans = self.publish_resources()?;
        let too_many_resources = beans.len() > self.config.resource_limit;
        let grouping = if too_many_resources {
            tracing::info!(
                target: TRACING_TARGET_PUBLISH,
                resources = beans.len(),
                limit = self.config.resource_limit,
                "publish list too long, skipping grouping"
            );
            Grouping::Single {
                name: ALL_RESOURCES_GROUP.to_owned(),
            }
        } else {
            Grouping::ByAge
        };

        let partitioner = GroupPartitioner::new(
            self.config,
            |bean: &PublishResource| bean.date_last_modified,
            |bean: &PublishResource| bean.name.clone(),
            |name, beans| PublishGroup::new(name, beans),
        )?
        .with_grouping(grouping);

        Ok(PublishList {
            groups: partitioner.partition_at(beans, now),
            too_many_resources,
        })
    }

    fn provider(&self) -> Option<Box<dyn RelatedResourceProvider>> {
        let project_id = self.options.project_id?;
        self.registry
            .get(project_id)?
            .related_resource_provider(self.options)
    }

    /// One hop of modified strong relation targets, added at the top level.
    ///
    /// Added targets list their own targets one level deep without adding
    /// further top-level entries.
    fn direct_related(&self, resources: Vec<Resource>) -> RelatedResources {
        let mut present: BTreeSet<ResourceId> = resources.iter().map(|r| r.structure_id).collect();
        let mut targets_of = BTreeMap::new();
        let mut added = Vec::new();

        for resource in resources.iter().filter(|r| !r.state.is_unchanged()) {
            let targets = self.modified_strong_targets(resource);
            for target in &targets {
                if present.insert(target.structure_id) {
                    added.push(target.clone());
                }
            }
            targets_of.insert(resource.structure_id, targets);
        }
        for target in &added {
            targets_of.insert(target.structure_id, self.modified_strong_targets(target));
        }

        let mut result = RelatedResources::default();
        for resource in resources.into_iter().chain(added) {
            let targets = targets_of.remove(&resource.structure_id).unwrap_or_default();
            result.insert(resource, targets);
        }
        result
    }

    fn modified_strong_targets(&self, resource: &Resource) -> Vec<Resource> {
        let relations = match self
            .cms
            .read_relations(resource.structure_id, RelationFilter::targets().strong())
        {
            Ok(relations) => relations,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_PUBLISH,
                    resource_id = %resource.structure_id,
                    error = %err,
                    "failed to read relations"
                );
                return Vec::new();
            }
        };

        relations
            .iter()
            .filter_map(|relation| {
                match self
                    .cms
                    .read_relation_target(relation, ResourceFilter::ModifiedOnly)
                {
                    Ok(target) => Some(target),
                    Err(err) if err.is_not_found() => {
                        tracing::debug!(
                            target: TRACING_TARGET_PUBLISH,
                            source = %resource.root_path,
                            target_path = %relation.target_path,
                            "relation target is not modified or missing"
                        );
                        None
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET_PUBLISH,
                            source = %resource.root_path,
                            target_path = %relation.target_path,
                            error = %err,
                            "failed to read relation target"
                        );
                        None
                    }
                }
            })
            .filter(|target| target.structure_id != resource.structure_id)
            .collect()
    }
}

/// Converts resources into beans.
pub(crate) struct BeanFactory<'a> {
    cms: &'a dyn CmsRepository,
    removable: BTreeSet<ResourceId>,
    user_names: BTreeMap<UserId, String>,
}

impl<'a> BeanFactory<'a> {
    pub(crate) fn new(cms: &'a dyn CmsRepository, ctx: &CmsContext) -> Self {
        let removable = match cms.user_publish_list(ctx) {
            Ok(list) => list.into_iter().map(|resource| resource.structure_id).collect(),
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_PUBLISH,
                    error = %err,
                    "failed to read the user publish list"
                );
                BTreeSet::new()
            }
        };
        Self {
            cms,
            removable,
            user_names: BTreeMap::new(),
        }
    }

    pub(crate) fn build(
        mut self,
        related: &RelatedResources,
        exclusions: &Exclusions,
    ) -> Vec<PublishResource> {
        let mut beans = Vec::with_capacity(related.len());
        for resource in related.top_level() {
            let mut bean = self.bean(resource, exclusions.info(&resource.structure_id));
            for child in related.related(&resource.structure_id) {
                let info = exclusions.info(&child.structure_id).unwrap_or_else(|| {
                    PublishResourceInfo::new(
                        InfoKind::Related,
                        format!("Published together with {}", resource.root_path),
                    )
                });
                bean.related.push(self.bean(child, Some(info)));
            }
            beans.push(bean);
        }
        beans
    }

    pub(crate) fn bean(
        &mut self,
        resource: &Resource,
        info: Option<PublishResourceInfo>,
    ) -> PublishResource {
        PublishResource {
            id: resource.structure_id,
            name: resource.root_path.clone(),
            title: resource
                .title
                .clone()
                .unwrap_or_else(|| resource.name().to_owned()),
            resource_type: resource.type_name.clone(),
            state: resource.state,
            date_last_modified: resource.date_last_modified,
            user_last_modified: self.user_name(resource.user_last_modified),
            removable: self.removable.contains(&resource.structure_id),
            info,
            related: Vec::new(),
        }
    }

    fn user_name(&mut self, id: UserId) -> String {
        let cms = self.cms;
        self.user_names
            .entry(id)
            .or_insert_with(|| cms.user_name(id).unwrap_or_else(|_| id.to_string()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use publist_core::types::{ProjectId, RelationType, ResourceState};

    use super::*;
    use crate::project::{CurrentPageProject, MyChangesProject};
    use crate::testing::{FailingRepository, Scenario};

    fn assemble(
        s: &Scenario,
        config: &PublishConfig,
        options: &PublishOptions,
    ) -> PublishResult<Vec<PublishResource>> {
        let registry = VirtualProjectRegistry::with_defaults();
        PublishListAssembler::new(&s.repository, &s.ctx, config, &registry, options)
            .publish_resources()
    }

    fn names(beans: &[PublishResource]) -> Vec<&str> {
        beans.iter().map(|bean| bean.name.as_str()).collect()
    }

    #[test]
    fn user_publish_list_with_related() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let image = s.file("/image.png", "image", ResourceState::New);
        s.relate(&page, &image, RelationType::EmbeddedImage);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let beans = assemble(&s, &s.config(), &PublishOptions::default()).unwrap();
        assert_eq!(names(&beans), vec!["/page.html"]);
        assert!(beans[0].removable);
        assert_eq!(beans[0].user_last_modified, "editor");

        let related = &beans[0].related;
        assert_eq!(names(related), vec!["/image.png"]);
        assert!(!related[0].removable);
        assert_eq!(
            related[0].info.as_ref().map(|info| info.kind),
            Some(InfoKind::Related)
        );
    }

    #[test]
    fn without_related_every_resource_stands_alone() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let article = s.file("/article.xml", "article", ResourceState::Changed);
        s.relate(&page, &article, RelationType::XmlStrong);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let options = PublishOptions::default().with_related(false);
        let beans = assemble(&s, &s.config(), &options).unwrap();
        assert_eq!(names(&beans), vec!["/page.html"]);
        assert!(beans[0].related.is_empty());
    }

    #[test]
    fn unchanged_entries_of_the_user_list_are_reported_published() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Unchanged);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let beans = assemble(&s, &s.config(), &PublishOptions::default()).unwrap();
        assert_eq!(beans.len(), 1);
        assert_eq!(
            beans[0].info.as_ref().map(|info| info.kind),
            Some(InfoKind::Published)
        );
        assert!(beans[0].is_blocked());
    }

    #[test]
    fn direct_mode_adds_one_hop_at_top_level() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let article = s.file("/article.xml", "article", ResourceState::Changed);
        let image = s.file("/image.png", "image", ResourceState::New);
        s.relate(&page, &article, RelationType::XmlStrong);
        s.relate(&article, &image, RelationType::XmlStrong);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let config = PublishConfig {
            related_mode: RelatedMode::Direct,
            ..s.config()
        };
        let beans = assemble(&s, &config, &PublishOptions::default()).unwrap();

        let mut top = names(&beans);
        top.sort();
        assert_eq!(top, vec!["/article.xml", "/page.html"]);
        let page_bean = beans.iter().find(|bean| bean.id == page.structure_id).unwrap();
        assert_eq!(names(&page_bean.related), vec!["/article.xml"]);
    }

    #[test]
    fn direct_mode_lists_targets_of_added_resources() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let article = s.file("/article.xml", "article", ResourceState::Changed);
        let image = s.file("/image.png", "image", ResourceState::New);
        s.relate(&page, &article, RelationType::XmlStrong);
        s.relate(&article, &image, RelationType::XmlStrong);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let config = PublishConfig {
            related_mode: RelatedMode::Direct,
            ..s.config()
        };
        let beans = assemble(&s, &config, &PublishOptions::default()).unwrap();

        assert!(beans.iter().all(|bean| bean.id != image.structure_id));
        let article_bean = beans
            .iter()
            .find(|bean| bean.id == article.structure_id)
            .unwrap();
        assert_eq!(names(&article_bean.related), vec!["/image.png"]);
        assert_eq!(
            article_bean.related[0].info.as_ref().map(|info| info.kind),
            Some(InfoKind::Related)
        );
    }

    #[test]
    fn unreadable_relation_targets_are_skipped() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let article = s.file("/article.xml", "article", ResourceState::Changed);
        s.relate(&page, &article, RelationType::XmlStrong);
        s.repository.add_to_publish_list(s.ctx.user_id, page.structure_id);

        let failing = FailingRepository::new(&s.repository).failing_relation_reads();
        let config = PublishConfig {
            related_mode: RelatedMode::Direct,
            ..s.config()
        };
        let registry = VirtualProjectRegistry::with_defaults();
        let options = PublishOptions::default();
        let beans = PublishListAssembler::new(&failing, &s.ctx, &config, &registry, &options)
            .publish_resources()
            .unwrap();

        assert_eq!(names(&beans), vec!["/page.html"]);
        assert!(beans[0].related.is_empty());
    }

    #[test]
    fn siblings_are_added_on_request() {
        let s = Scenario::new();
        let a = s.file("/a.html", "plain", ResourceState::Changed);
        let mut b = s.file("/b.html", "plain", ResourceState::Changed);
        b.content_id = Some(a.content_id());
        s.repository.insert_resource(b.clone());
        s.repository.add_to_publish_list(s.ctx.user_id, a.structure_id);

        let options = PublishOptions::default().with_related(false);
        assert_eq!(assemble(&s, &s.config(), &options).unwrap().len(), 1);

        let options = options.with_siblings(true);
        let beans = assemble(&s, &s.config(), &options).unwrap();
        assert_eq!(names(&beans), vec!["/a.html", "/b.html"]);
    }

    #[test]
    fn temporary_files_are_dropped() {
        let s = Scenario::new();
        let page = s.file("/page.html", "containerpage", ResourceState::Changed);
        let temp = s.file("/~page.html", "containerpage", ResourceState::New);
        let mut flagged = s.file("/draft.xml", "article", ResourceState::New);
        flagged.temporary = true;
        s.repository.insert_resource(flagged.clone());
        s.relate(&page, &flagged, RelationType::XmlStrong);
        for resource in [&page, &temp, &flagged] {
            s.repository.add_to_publish_list(s.ctx.user_id, resource.structure_id);
        }

        let beans = assemble(&s, &s.config(), &PublishOptions::default()).unwrap();
        assert_eq!(names(&beans), vec!["/page.html"]);
        assert!(beans[0].related.is_empty());
    }

    #[test]
    fn real_project_lists_its_changes() {
        let s = Scenario::new();
        s.file("/a.html", "plain", ResourceState::Changed);
        let options = PublishOptions::default().with_project(s.project);
        let beans = assemble(&s, &s.config(), &options).unwrap();
        assert_eq!(names(&beans), vec!["/a.html"]);
        assert!(!beans[0].removable);
    }

    #[test]
    fn unknown_project_is_an_error() {
        let s = Scenario::new();
        let missing = ProjectId::new();
        let options = PublishOptions::default().with_project(missing);
        let err = assemble(&s, &s.config(), &options).unwrap_err();
        assert!(matches!(err, PublishError::ProjectNotFound(id) if id == missing));
    }

    #[test]
    fn virtual_project_without_required_params_is_rejected() {
        let s = Scenario::new();
        let options = PublishOptions::default().with_project(CurrentPageProject::ID);
        let err = assemble(&s, &s.config(), &options).unwrap_err();
        assert!(matches!(
            err,
            PublishError::InvalidOptions(ref message) if message.contains("containerpage")
        ));
        assert_eq!(err.error_code(), "invalid_options");
    }

    #[test]
    fn virtual_project_provider_feeds_the_finder() {
        let s = Scenario::new();
        let page = s.file("/index.html", "containerpage", ResourceState::Changed);
        let teaser = s.file("/teaser.xml", "article", ResourceState::Changed);
        let options = PublishOptions::default()
            .with_project(CurrentPageProject::ID)
            .with_param("containerpage", page.structure_id.to_string())
            .with_param("elements", teaser.structure_id.to_string());

        let beans = assemble(&s, &s.config(), &options).unwrap();
        assert_eq!(names(&beans), vec!["/index.html"]);
        assert_eq!(names(&beans[0].related), vec!["/teaser.xml"]);
    }

    #[test]
    fn groups_by_age_and_flags_long_lists() {
        let s = Scenario::new();
        s.file_aged("/today.html", SignedDuration::from_hours(1));
        s.file_aged("/last-week.html", SignedDuration::from_hours(10 * 24));
        let registry = VirtualProjectRegistry::with_defaults();
        let options = PublishOptions::default()
            .with_project(MyChangesProject::ID)
            .with_related(false);

        let config = s.config();
        let list = PublishListAssembler::new(&s.repository, &s.ctx, &config, &registry, &options)
            .publish_list_at(s.now)
            .unwrap();
        assert!(!list.too_many_resources);
        assert_eq!(list.groups.len(), 2);
        assert_eq!(list.resource_count(), 2);

        let config = PublishConfig {
            resource_limit: 1,
            ..s.config()
        };
        let list = PublishListAssembler::new(&s.repository, &s.ctx, &config, &registry, &options)
            .publish_list_at(s.now)
            .unwrap();
        assert!(list.too_many_resources);
        assert_eq!(list.groups.len(), 1);
        assert_eq!(list.groups[0].name, ALL_RESOURCES_GROUP);
        assert_eq!(list.resources().count(), 2);
    }
}
