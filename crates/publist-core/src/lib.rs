#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # Publist Core
//!
//! Domain types shared by the publish-list engine: resources, relations,
//! projects, publish options and the beans handed back to a publish dialog.
//! The content repository itself is reached only through the ports in
//! [`repository`]; [`memory`] provides a snapshot-backed implementation.

/// Tracing target for repository operations.
pub const TRACING_TARGET_REPOSITORY: &str = "publist_core::repository";

mod error;

pub mod memory;
pub mod repository;
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
