//! Hook for resources related by something other than stored relations.

use publist_core::Result;
use publist_core::repository::CmsRepository;
use publist_core::types::Resource;

/// Supplies extra related resources for a resource.
///
/// Virtual projects use this to attach resources the relation table does not
/// know about, such as the elements placed on a container page.
pub trait RelatedResourceProvider: Send + Sync {
    /// Returns resources that should be treated as directly related to
    /// `resource`.
    fn additional_related_resources(
        &self,
        cms: &dyn CmsRepository,
        resource: &Resource,
    ) -> Result<Vec<Resource>>;
}
