//! Broken-link validation of a publish list.

use std::collections::{BTreeMap, BTreeSet};

use publist_core::repository::CmsRepository;
use publist_core::types::{RelationFilter, Resource, ResourceFilter, ResourceId};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::TRACING_TARGET_VALIDATE;

/// Why a link would break online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BrokenLinkKind {
    /// The target is deleted by the publish but still referenced.
    DeletedTarget,
    /// The target is new and not part of the publish.
    UnpublishedTarget,
}

impl BrokenLinkKind {
    /// Returns a human readable explanation.
    pub const fn description(self) -> &'static str {
        match self {
            Self::DeletedTarget => "The link target is deleted by this publish",
            Self::UnpublishedTarget => "The link target is new and not part of this publish",
        }
    }
}

/// A relation whose target would be missing online after publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// Resource holding the link.
    pub source: Resource,
    /// Resource the link points to.
    pub target: Resource,
    /// Cause.
    pub kind: BrokenLinkKind,
}

/// Finds links a publish would break.
pub struct LinkValidator<'a> {
    cms: &'a dyn CmsRepository,
}

impl<'a> LinkValidator<'a> {
    /// Creates a validator.
    pub fn new(cms: &'a dyn CmsRepository) -> Self {
        Self { cms }
    }

    /// Validates a list of resources about to be published.
    ///
    /// Reports deleted resources that other resources still point to, unless
    /// the source is deleted by the same publish, and strong targets of
    /// published resources that are new and left out of the list.
    pub fn validate(&self, resources: &[Resource]) -> Vec<BrokenLink> {
        let listed: BTreeMap<ResourceId, &Resource> = resources
            .iter()
            .map(|resource| (resource.structure_id, resource))
            .collect();
        let mut seen = BTreeSet::new();
        let mut broken = Vec::new();

        for resource in resources {
            let links = if resource.state.is_deleted() {
                self.deleted_targets(resource, &listed)
            } else {
                self.unpublished_targets(resource, &listed)
            };
            for link in links {
                let key = (link.source.structure_id, link.target.structure_id);
                if seen.insert(key) {
                    broken.push(link);
                }
            }
        }

        if !broken.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_VALIDATE,
                resources = resources.len(),
                broken = broken.len(),
                "publish would break links"
            );
        }
        broken
    }

    fn deleted_targets(
        &self,
        deleted: &Resource,
        listed: &BTreeMap<ResourceId, &Resource>,
    ) -> Vec<BrokenLink> {
        let relations = match self
            .cms
            .read_relations(deleted.structure_id, RelationFilter::sources())
        {
            Ok(relations) => relations,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_VALIDATE,
                    resource_id = %deleted.structure_id,
                    error = %err,
                    "failed to read incoming relations"
                );
                return Vec::new();
            }
        };

        relations
            .iter()
            .filter_map(|relation| {
                match self.cms.read_relation_source(relation, ResourceFilter::All) {
                    Ok(resource) => Some(resource),
                    Err(err) if err.is_not_found() => {
                        tracing::debug!(
                            target: TRACING_TARGET_VALIDATE,
                            resource_id = %deleted.structure_id,
                            target_path = %relation.target_path,
                            "skipping unresolvable relation source"
                        );
                        None
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET_VALIDATE,
                            resource_id = %deleted.structure_id,
                            target_path = %relation.target_path,
                            error = %err,
                            "failed to read relation source"
                        );
                        None
                    }
                }
            })
            .filter(|source| source.structure_id != deleted.structure_id)
            .filter(|source| {
                !listed
                    .get(&source.structure_id)
                    .is_some_and(|listed| listed.state.is_deleted())
            })
            .map(|source| BrokenLink {
                source,
                target: deleted.clone(),
                kind: BrokenLinkKind::DeletedTarget,
            })
            .collect()
    }

    fn unpublished_targets(
        &self,
        resource: &Resource,
        listed: &BTreeMap<ResourceId, &Resource>,
    ) -> Vec<BrokenLink> {
        let relations = match self
            .cms
            .read_relations(resource.structure_id, RelationFilter::targets().strong())
        {
            Ok(relations) => relations,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_VALIDATE,
                    resource_id = %resource.structure_id,
                    error = %err,
                    "failed to read outgoing relations"
                );
                return Vec::new();
            }
        };

        relations
            .iter()
            .filter_map(|relation| {
                match self.cms.read_relation_target(relation, ResourceFilter::All) {
                    Ok(resource) => Some(resource),
                    Err(err) if err.is_not_found() => {
                        tracing::debug!(
                            target: TRACING_TARGET_VALIDATE,
                            resource_id = %resource.structure_id,
                            target_path = %relation.target_path,
                            "skipping unresolvable relation target"
                        );
                        None
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET_VALIDATE,
                            resource_id = %resource.structure_id,
                            target_path = %relation.target_path,
                            error = %err,
                            "failed to read relation target"
                        );
                        None
                    }
                }
            })
            .filter(|target| target.state.is_new() && !listed.contains_key(&target.structure_id))
            .map(|target| BrokenLink {
                source: resource.clone(),
                target,
                kind: BrokenLinkKind::UnpublishedTarget,
            })
            .collect()
    }
}
