//! Virtual projects.
//!
//! A virtual project selects resources for publishing without being stored
//! in the repository: the page being edited, an explicit file list, or the
//! user's own changes. Handlers are looked up by a fixed id in a
//! [`VirtualProjectRegistry`] that is built once at startup and handed to the
//! assembler.

mod current_page;
mod direct_publish;
mod my_changes;
mod real;

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::{CmsContext, ProjectBean, ProjectId, PublishOptions, Resource};

pub use self::current_page::{CurrentPageProject, ElementProvider};
pub use self::direct_publish::DirectPublishProject;
pub use self::my_changes::MyChangesProject;
pub use self::real::RealProjectWrapper;
use crate::TRACING_TARGET_PROJECT;
use crate::relation::RelatedResourceProvider;

/// A source of resources to publish that is addressed like a project.
pub trait VirtualProject: Send + Sync {
    /// Returns the fixed id under which the handler is registered.
    fn project_id(&self) -> ProjectId;

    /// Returns the selector entry, or `None` when the handler does not apply
    /// to the given options.
    fn project_bean(
        &self,
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Option<ProjectBean>;

    /// Returns the raw resources to publish.
    fn resources(
        &self,
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Result<Vec<Resource>>;

    /// Returns the parameters that must be present in the options when this
    /// project is selected.
    fn required_params(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns a provider of extra related resources for the relation finder.
    fn related_resource_provider(
        &self,
        _options: &PublishOptions,
    ) -> Option<Box<dyn RelatedResourceProvider>> {
        None
    }
}

/// Handlers for virtual projects, keyed by project id.
///
/// Registration is first-wins: a handler whose id is already taken is
/// dropped. There is no way to unregister a handler.
#[derive(Default)]
pub struct VirtualProjectRegistry {
    handlers: Vec<Box<dyn VirtualProject>>,
}

impl VirtualProjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CurrentPageProject);
        registry.register(DirectPublishProject);
        registry.register(MyChangesProject);
        registry
    }

    /// Registers a handler. Returns `false` if its id is already taken.
    pub fn register(&mut self, handler: impl VirtualProject + 'static) -> bool {
        let id = handler.project_id();
        if self.contains(id) {
            tracing::debug!(
                target: TRACING_TARGET_PROJECT,
                project_id = %id,
                "ignoring duplicate virtual project handler"
            );
            return false;
        }

        tracing::trace!(
            target: TRACING_TARGET_PROJECT,
            project_id = %id,
            "registered virtual project handler"
        );
        self.handlers.push(Box::new(handler));
        true
    }

    /// Returns the handler for a project id.
    pub fn get(&self, id: ProjectId) -> Option<&dyn VirtualProject> {
        self.handlers
            .iter()
            .find(|handler| handler.project_id() == id)
            .map(|handler| &**handler)
    }

    /// Returns whether a handler is registered for a project id.
    pub fn contains(&self, id: ProjectId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates over the handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn VirtualProject> {
        self.handlers.iter().map(|handler| &**handler)
    }

    /// Returns the selector entries of every handler that applies to the
    /// options, in registration order.
    pub fn project_beans(
        &self,
        cms: &dyn CmsRepository,
        ctx: &CmsContext,
        options: &PublishOptions,
    ) -> Vec<ProjectBean> {
        self.iter()
            .filter_map(|handler| handler.project_bean(cms, ctx, options))
            .collect()
    }
}

impl std::fmt::Debug for VirtualProjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|handler| handler.project_id()))
            .finish()
    }
}
