//! Recency grouping for the publish dialog.
//!
//! Resources edited within the last week are grouped by editing session,
//! resources from the last four weeks by calendar day, and everything older
//! lands in one catch-all group. Day arithmetic happens in the configured
//! local time zone.

mod label;
mod partitioner;

pub use label::{AgeBand, GroupLabel};
pub use partitioner::{GroupPartitioner, Grouping};
