//! Publish-list assembly.
//!
//! [`PublishListAssembler`] turns the publish options of a request into the
//! annotated, grouped list shown in the publish dialog. Per-resource failures
//! never abort the request: the resource is logged and excluded instead.

mod assembler;
mod exclusion;

pub(crate) use self::assembler::BeanFactory;
pub use self::assembler::{ALL_RESOURCES_GROUP, PublishList, PublishListAssembler};
pub use self::exclusion::Exclusions;
