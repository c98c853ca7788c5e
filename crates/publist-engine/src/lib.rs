#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;

pub mod group;
pub mod project;
pub mod publish;
pub mod relation;
pub mod service;
pub mod session;
pub mod validate;

#[doc(hidden)]
pub mod prelude;

#[cfg(test)]
mod testing;

pub use config::{PublishConfig, PublishConfigBuilder, PublishConfigBuilderError, RelatedMode};
pub use error::{PublishError, PublishResult};

/// Tracing target for relation closure.
pub const TRACING_TARGET_RELATION: &str = "publist_engine::relation";

/// Tracing target for publish group partitioning.
pub const TRACING_TARGET_GROUP: &str = "publist_engine::group";

/// Tracing target for virtual projects.
pub const TRACING_TARGET_PROJECT: &str = "publist_engine::project";

/// Tracing target for publish list assembly.
pub const TRACING_TARGET_PUBLISH: &str = "publist_engine::publish";

/// Tracing target for link validation.
pub const TRACING_TARGET_VALIDATE: &str = "publist_engine::validate";

/// Tracing target for the service facade.
pub const TRACING_TARGET_SERVICE: &str = "publist_engine::service";
