//! Loaded repository and request context.

use std::sync::Arc;

use anyhow::Context;
use publist_core::memory::{MemoryRepository, RepositorySnapshot};
use publist_core::repository::{CmsRepository, ResourceStore};
use publist_core::types::{CmsContext, ResourceFilter, ResourceId};

use crate::TRACING_TARGET_CONFIG;
use crate::config::RepositoryConfig;

/// An in-memory repository together with the context requests run in.
pub struct Workspace {
    repository: Arc<MemoryRepository>,
    context: CmsContext,
}

impl Workspace {
    /// Reads the configured snapshot.
    pub fn load(config: &RepositoryConfig) -> anyhow::Result<Self> {
        let snapshot = RepositorySnapshot::from_path(&config.snapshot)
            .context("failed to load repository snapshot")?;
        Self::from_snapshot(snapshot, config)
    }

    /// Builds a workspace from an already parsed snapshot.
    pub fn from_snapshot(
        snapshot: RepositorySnapshot,
        config: &RepositoryConfig,
    ) -> anyhow::Result<Self> {
        let user = snapshot
            .users
            .iter()
            .find(|user| user.name == config.user)
            .with_context(|| format!("unknown user '{}'", config.user))?
            .clone();

        let project = match &config.current_project {
            Some(name) => snapshot
                .projects
                .iter()
                .find(|project| &project.name == name)
                .with_context(|| format!("unknown project '{name}'"))?,
            None => snapshot
                .projects
                .iter()
                .find(|project| project.managers.contains(&user.id))
                .or_else(|| snapshot.projects.first())
                .context("snapshot contains no project")?,
        };

        let mut context = CmsContext::new(user.id, user.name, project.id);
        if let Some(session) = &config.session {
            context = context.with_session(session.as_str());
        }

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            user_id = %context.user_id,
            current_project = %context.current_project,
            "request context resolved"
        );

        Ok(Self {
            repository: Arc::new(MemoryRepository::from_snapshot(snapshot)),
            context,
        })
    }

    /// Returns the request context.
    pub fn context(&self) -> &CmsContext {
        &self.context
    }

    /// Returns the repository behind the engine's ports.
    pub fn repository(&self) -> Arc<dyn CmsRepository> {
        self.repository.clone()
    }

    /// Resolves a resource given by structure id or root path.
    pub fn resolve(&self, reference: &str) -> anyhow::Result<ResourceId> {
        if let Ok(id) = reference.parse::<ResourceId>() {
            return Ok(id);
        }
        let resource = self
            .repository
            .read_resource_by_path(reference, ResourceFilter::All)
            .with_context(|| format!("no resource at '{reference}'"))?;
        Ok(resource.structure_id)
    }

    /// Resolves a list of resource references.
    pub fn resolve_all(&self, references: &[String]) -> anyhow::Result<Vec<ResourceId>> {
        references
            .iter()
            .map(|reference| self.resolve(reference))
            .collect()
    }
}
