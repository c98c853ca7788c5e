//! Relation reachability for publish lists.
//!
//! Publishing a page without the resources it links to leaves broken links
//! online. [`RelationFinder`] walks the relation graph of a seed set, closes it
//! transitively and reports, per seed, every changed resource that has to be
//! published along with it.

mod finder;
mod provider;
mod resource_map;

pub use finder::{RelatedResources, RelationFinder};
pub use provider::RelatedResourceProvider;
pub use resource_map::ResourceMap;
