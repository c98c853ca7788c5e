//! Transitive relation finder.

use std::collections::{BTreeMap, BTreeSet};

use publist_core::repository::CmsRepository;
use publist_core::types::{RelationFilter, Resource, ResourceFilter, ResourceId};

use super::{RelatedResourceProvider, ResourceMap};
use crate::{PublishConfig, TRACING_TARGET_RELATION};

/// Resources to publish, each with the changed resources it depends on.
#[derive(Debug, Clone, Default)]
pub struct RelatedResources {
    map: ResourceMap,
    resources: BTreeMap<ResourceId, Resource>,
}

impl RelatedResources {
    /// Creates a result in which every resource stands alone.
    pub fn without_relations(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut result = Self::default();
        for resource in resources {
            result.map.insert(resource.structure_id, BTreeSet::new());
            result.resources.insert(resource.structure_id, resource);
        }
        result
    }

    /// Adds a top-level resource with its related resources.
    pub fn insert(&mut self, resource: Resource, related: impl IntoIterator<Item = Resource>) {
        let mut ids = BTreeSet::new();
        for related in related {
            ids.insert(related.structure_id);
            self.resources.insert(related.structure_id, related);
        }
        self.map.insert(resource.structure_id, ids);
        self.resources.insert(resource.structure_id, resource);
    }

    /// Returns the underlying id map.
    pub fn map(&self) -> &ResourceMap {
        &self.map
    }

    /// Returns the number of top-level resources.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether there are no top-level resources.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up a resource that occurs anywhere in the result.
    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Iterates over top-level resources in id order.
    pub fn top_level(&self) -> impl Iterator<Item = &Resource> {
        self.map.keys().filter_map(|id| self.resources.get(id))
    }

    /// Returns the related resources of a top-level resource, sorted by path.
    pub fn related(&self, id: &ResourceId) -> Vec<&Resource> {
        let mut related: Vec<&Resource> = self
            .map
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.resources.get(id))
            .collect();
        related.sort_by(|a, b| a.root_path.cmp(&b.root_path));
        related
    }

    /// Iterates over every resource, top-level or related.
    pub fn all_resources(&self) -> Vec<&Resource> {
        self.map
            .all_ids()
            .into_iter()
            .filter_map(|id| self.resources.get(&id))
            .collect()
    }

    /// Drops every resource, top-level or related, matching the predicate.
    pub fn retain(&mut self, keep: impl Fn(&Resource) -> bool) {
        let dropped: BTreeSet<ResourceId> = self
            .resources
            .values()
            .filter(|resource| !keep(resource))
            .map(|resource| resource.structure_id)
            .collect();
        if dropped.is_empty() {
            return;
        }

        self.map = std::mem::take(&mut self.map)
            .into_iter()
            .filter(|(key, _)| !dropped.contains(key))
            .map(|(key, values)| (key, &values - &dropped))
            .collect();
        self.resources.retain(|id, _| !dropped.contains(id));
    }
}

/// Computes the changed resources a set of seed resources depends on.
///
/// The finder works in five stages:
///
/// 1. breadth-first discovery of direct relations starting at the seeds,
/// 2. reflexive-transitive closure by fixed-point iteration,
/// 3. per seed, the reachable resources that can be published,
/// 4. removal of seeds that are already listed under another seed,
/// 5. replacement of unpublishable top-level entries by their children.
///
/// Reading failures for single relations or parents are logged and skipped.
pub struct RelationFinder<'a> {
    cms: &'a dyn CmsRepository,
    config: &'a PublishConfig,
    originals: BTreeMap<ResourceId, Resource>,
    keep_original_unchanged: bool,
    provider: Option<&'a dyn RelatedResourceProvider>,
}

impl<'a> RelationFinder<'a> {
    /// Creates a finder for the given seed resources.
    ///
    /// With `keep_original_unchanged`, unchanged seeds stay in the result
    /// instead of being replaced by their children.
    pub fn new(
        cms: &'a dyn CmsRepository,
        config: &'a PublishConfig,
        seeds: impl IntoIterator<Item = Resource>,
        keep_original_unchanged: bool,
    ) -> Self {
        Self {
            cms,
            config,
            originals: seeds
                .into_iter()
                .map(|resource| (resource.structure_id, resource))
                .collect(),
            keep_original_unchanged,
            provider: None,
        }
    }

    /// Attaches a provider of additional related resources.
    pub fn with_provider(mut self, provider: Option<&'a dyn RelatedResourceProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Runs all stages and returns the seeds with their publish-related resources.
    pub fn publish_related_resources(&self) -> RelatedResources {
        let mut catalog = self.originals.clone();
        let related = self.compute_related(&mut catalog);
        let reachability = self.compute_reachability(&related);
        let mut publish_related = self.changed_reachable_from_originals(&reachability, &catalog);
        remove_nested_items_from_top_level(&mut publish_related);
        self.remove_unchanged_top_level(&mut publish_related, &reachability, &catalog);

        tracing::debug!(
            target: TRACING_TARGET_RELATION,
            seeds = self.originals.len(),
            discovered = catalog.len(),
            top_level = publish_related.len(),
            "computed publish related resources"
        );

        let ids = publish_related.all_ids();
        catalog.retain(|id, _| ids.contains(id));
        RelatedResources {
            map: publish_related,
            resources: catalog,
        }
    }

    /// Stage 1: direct relations of every resource reachable from the seeds.
    pub fn compute_related(&self, catalog: &mut BTreeMap<ResourceId, Resource>) -> ResourceMap {
        let mut result = ResourceMap::new();
        let mut processed = BTreeSet::new();
        let mut current: BTreeSet<ResourceId> = self.originals.keys().copied().collect();

        while !current.is_empty() {
            let mut discovered = BTreeSet::new();
            for id in &current {
                let Some(resource) = catalog.get(id).cloned() else {
                    continue;
                };
                let direct = self.directly_related(&resource);
                let ids: BTreeSet<ResourceId> =
                    direct.iter().map(|related| related.structure_id).collect();
                for related in direct {
                    catalog.entry(related.structure_id).or_insert(related);
                }
                discovered.extend(ids.iter().copied());
                result.insert(*id, ids);
            }
            processed.extend(current);
            discovered.retain(|id| !processed.contains(id));
            current = discovered;
        }

        result
    }

    /// Stage 2: reflexive-transitive closure of the direct relation map.
    pub fn compute_reachability(&self, related: &ResourceMap) -> ResourceMap {
        let mut reachable: ResourceMap = related
            .iter()
            .map(|(key, values)| {
                let mut values = values.clone();
                values.insert(*key);
                (*key, values)
            })
            .collect();
        let mut edges = reachable.edge_count();

        for iteration in 0..self.config.max_reachability_iterations {
            let next: ResourceMap = reachable
                .iter()
                .map(|(key, values)| {
                    let mut expanded = values.clone();
                    for value in values {
                        if let Some(further) = reachable.get(value) {
                            expanded.extend(further.iter().copied());
                        }
                    }
                    (*key, expanded)
                })
                .collect();

            let next_edges = next.edge_count();
            reachable = next;
            if next_edges == edges {
                tracing::trace!(
                    target: TRACING_TARGET_RELATION,
                    iterations = iteration + 1,
                    edges,
                    "reachability converged"
                );
                return reachable;
            }
            edges = next_edges;
        }

        tracing::warn!(
            target: TRACING_TARGET_RELATION,
            max_iterations = self.config.max_reachability_iterations,
            edges,
            "reachability did not converge, using partial closure"
        );
        reachable
    }

    /// Stage 3: for each seed, the reachable resources that can be published.
    pub fn changed_reachable_from_originals(
        &self,
        reachability: &ResourceMap,
        catalog: &BTreeMap<ResourceId, Resource>,
    ) -> ResourceMap {
        self.originals
            .keys()
            .map(|seed| {
                let related = reachability
                    .get(seed)
                    .into_iter()
                    .flatten()
                    .filter(|candidate| *candidate != seed)
                    .filter(|candidate| {
                        catalog
                            .get(candidate)
                            .is_some_and(|resource| !self.is_unchanged_and_prunable(resource))
                    })
                    .copied()
                    .collect();
                (*seed, related)
            })
            .collect()
    }

    /// Stage 5: replaces unpublishable top-level keys by their children.
    ///
    /// Children already listed elsewhere are dropped. The remaining ones are
    /// nested below each other where one reaches the other, and promoted to
    /// top-level keys otherwise.
    pub fn remove_unchanged_top_level(
        &self,
        publish_related: &mut ResourceMap,
        reachability: &ResourceMap,
        catalog: &BTreeMap<ResourceId, Resource>,
    ) {
        let unchanged: Vec<ResourceId> = publish_related
            .keys()
            .filter(|id| {
                catalog
                    .get(id)
                    .is_some_and(|resource| self.is_unchanged_and_prunable(resource))
            })
            .copied()
            .collect();
        if unchanged.is_empty() {
            return;
        }

        let mut orphans = BTreeSet::new();
        for id in &unchanged {
            if let Some(children) = publish_related.remove(id) {
                orphans.extend(children);
            }
        }

        let present = publish_related.all_ids();
        orphans.retain(|id| !present.contains(id));

        let mut orphan_map: ResourceMap = orphans
            .iter()
            .map(|orphan| {
                let children = reachability
                    .get(orphan)
                    .into_iter()
                    .flatten()
                    .filter(|child| *child != orphan && orphans.contains(*child))
                    .copied()
                    .collect();
                (*orphan, children)
            })
            .collect();
        remove_nested_items_from_top_level(&mut orphan_map);

        tracing::debug!(
            target: TRACING_TARGET_RELATION,
            removed = unchanged.len(),
            promoted = orphan_map.len(),
            "replaced unchanged top-level resources"
        );
        publish_related.extend(orphan_map);
    }

    fn is_unchanged_and_prunable(&self, resource: &Resource) -> bool {
        resource.state.is_unchanged()
            && !(self.keep_original_unchanged
                && self.originals.contains_key(&resource.structure_id))
    }

    fn directly_related(&self, resource: &Resource) -> Vec<Resource> {
        let mut related = Vec::new();
        let id = resource.structure_id;

        match self.cms.read_relations(id, RelationFilter::targets()) {
            Ok(relations) => {
                for relation in relations {
                    let target = match self.cms.read_relation_target(&relation, ResourceFilter::All)
                    {
                        Ok(target) => target,
                        Err(err) if err.is_not_found() => {
                            tracing::debug!(
                                target: TRACING_TARGET_RELATION,
                                source = %resource.root_path,
                                target_path = %relation.target_path,
                                "skipping unresolvable relation target"
                            );
                            continue;
                        }
                        Err(err) => {
                            tracing::warn!(
                                target: TRACING_TARGET_RELATION,
                                source = %resource.root_path,
                                target_path = %relation.target_path,
                                error = %err,
                                "failed to read relation target"
                            );
                            continue;
                        }
                    };
                    if target.structure_id == id {
                        continue;
                    }
                    if relation.is_strong()
                        || self.config.follows_weak_relations_to(&target.type_name)
                    {
                        related.push(target);
                    }
                }
            }
            Err(err) => tracing::warn!(
                target: TRACING_TARGET_RELATION,
                resource_id = %id,
                path = %resource.root_path,
                error = %err,
                "failed to read relations"
            ),
        }

        match self.cms.read_parent_folder(id) {
            Ok(Some(parent)) if parent.state.is_new() || resource.is_file() => related.push(parent),
            Ok(_) => {}
            Err(err) => tracing::warn!(
                target: TRACING_TARGET_RELATION,
                resource_id = %id,
                path = %resource.root_path,
                error = %err,
                "failed to read parent folder"
            ),
        }

        if let Some(provider) = self.provider {
            match provider.additional_related_resources(self.cms, resource) {
                Ok(additional) => related.extend(
                    additional
                        .into_iter()
                        .filter(|candidate| candidate.structure_id != id),
                ),
                Err(err) => tracing::warn!(
                    target: TRACING_TARGET_RELATION,
                    resource_id = %id,
                    error = %err,
                    "related resource provider failed"
                ),
            }
        }

        related
    }
}

/// Stage 4: removes top-level keys that already occur under another key.
pub fn remove_nested_items_from_top_level(map: &mut ResourceMap) {
    let mut nested = BTreeSet::new();
    for (parent, children) in map.iter() {
        if nested.contains(parent) {
            continue;
        }
        for child in children {
            if child != parent && map.contains_key(child) {
                nested.insert(*child);
            }
        }
    }
    for id in &nested {
        map.remove(id);
    }
}
