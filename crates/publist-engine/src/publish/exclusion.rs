//! Reasons a listed resource cannot be published.

use std::collections::{BTreeMap, BTreeSet};

use publist_core::repository::CmsRepository;
use publist_core::types::{
    CmsContext, InfoKind, ProjectId, PublishResourceInfo, Resource, ResourceId,
};

use crate::TRACING_TARGET_PUBLISH;

/// Exclusion sets of a publish list.
///
/// Checks run in a fixed order: already published, missing permission,
/// blocking locks. A resource excluded by one check is skipped by the later
/// ones, so every resource carries at most one reason. Failed checks exclude
/// the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    published: BTreeSet<ResourceId>,
    permissions: BTreeSet<ResourceId>,
    locked: BTreeMap<ResourceId, String>,
}

impl Exclusions {
    /// Runs every check over the given resources.
    pub fn compute<'r>(
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        resources: impl IntoIterator<Item = &'r Resource>,
    ) -> Self {
        let resources: Vec<&Resource> = resources.into_iter().collect();
        let mut exclusions = Self::default();

        exclusions.published = resources
            .iter()
            .filter(|resource| resource.state.is_unchanged())
            .map(|resource| resource.structure_id)
            .collect();

        let mut managed = BTreeMap::new();
        for resource in &resources {
            if exclusions.contains(&resource.structure_id) {
                continue;
            }
            if !may_publish(cms, ctx, resource, &mut managed) {
                exclusions.permissions.insert(resource.structure_id);
            }
        }

        for resource in &resources {
            if exclusions.contains(&resource.structure_id) {
                continue;
            }
            if let Some(reason) = lock_block(cms, ctx, resource) {
                exclusions.locked.insert(resource.structure_id, reason);
            }
        }

        tracing::debug!(
            target: TRACING_TARGET_PUBLISH,
            published = exclusions.published.len(),
            permissions = exclusions.permissions.len(),
            locked = exclusions.locked.len(),
            "computed publish exclusions"
        );
        exclusions
    }

    /// Returns whether any check excluded the resource.
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.published.contains(id)
            || self.permissions.contains(id)
            || self.locked.contains_key(id)
    }

    /// Returns the ids excluded as already published.
    pub fn published(&self) -> &BTreeSet<ResourceId> {
        &self.published
    }

    /// Returns the ids excluded for missing permissions.
    pub fn permissions(&self) -> &BTreeSet<ResourceId> {
        &self.permissions
    }

    /// Returns the ids excluded for blocking locks.
    pub fn locked(&self) -> impl Iterator<Item = &ResourceId> {
        self.locked.keys()
    }

    /// Returns the number of excluded resources.
    pub fn len(&self) -> usize {
        self.published.len() + self.permissions.len() + self.locked.len()
    }

    /// Returns whether nothing was excluded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the annotation for an excluded resource.
    pub fn info(&self, id: &ResourceId) -> Option<PublishResourceInfo> {
        if self.published.contains(id) {
            Some(PublishResourceInfo::new(
                InfoKind::Published,
                "The resource has already been published",
            ))
        } else if self.permissions.contains(id) {
            Some(PublishResourceInfo::new(
                InfoKind::Permissions,
                "You are not allowed to publish this resource",
            ))
        } else {
            self.locked
                .get(id)
                .map(|reason| PublishResourceInfo::new(InfoKind::Locked, reason.clone()))
        }
    }
}

/// The user may publish with the direct-publish permission, or as a manager
/// of the project the resource was last modified in.
fn may_publish(
    cms: &dyn CmsRepository,
    ctx: &CmsContext,
    resource: &Resource,
    managed: &mut BTreeMap<ProjectId, bool>,
) -> bool {
    match cms.has_direct_publish_permission(ctx, resource.structure_id) {
        Ok(true) => return true,
        Ok(false) => {}
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_PUBLISH,
                resource_id = %resource.structure_id,
                path = %resource.root_path,
                error = %err,
                "permission check failed"
            );
            return false;
        }
    }

    let project = resource.project_last_modified;
    if let Some(is_manager) = managed.get(&project) {
        return *is_manager;
    }
    let is_manager = cms.is_manager_of(ctx, project).unwrap_or_else(|err| {
        tracing::warn!(
            target: TRACING_TARGET_PUBLISH,
            project_id = %project,
            error = %err,
            "project manager check failed"
        );
        false
    });
    managed.insert(project, is_manager);
    is_manager
}

fn lock_block(cms: &dyn CmsRepository, ctx: &CmsContext, resource: &Resource) -> Option<String> {
    let id = resource.structure_id;
    match cms.lock_owner(id) {
        Ok(Some(owner)) if owner != ctx.user_id => {
            let name = cms.user_name(owner).unwrap_or_else(|_| owner.to_string());
            return Some(format!("Locked by {name}"));
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_PUBLISH,
                resource_id = %id,
                error = %err,
                "lock check failed"
            );
            return Some("The lock state could not be read".into());
        }
    }

    match cms.blocking_locked_resources(ctx, id) {
        Ok(blocking) if blocking.is_empty() => None,
        Ok(blocking) => Some(format!(
            "{} resource(s) below are locked by other users",
            blocking.len()
        )),
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_PUBLISH,
                resource_id = %id,
                error = %err,
                "blocking lock check failed"
            );
            Some("The lock state could not be read".into())
        }
    }
}
