//! Age bands and group names.

use std::fmt;

use jiff::Zoned;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Recency class of a resource, measured in local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgeBand {
    /// Grouped by editing session.
    Young,
    /// Grouped by calendar day.
    Medium,
    /// Collected in one catch-all group.
    Old,
}

impl AgeBand {
    /// Classifies an age in local days against the band limits.
    pub fn classify(age_days: i64, young_days: i64, medium_days: i64) -> Self {
        if age_days < young_days {
            Self::Young
        } else if age_days < medium_days {
            Self::Medium
        } else {
            Self::Old
        }
    }
}

/// What a publish group is named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLabel {
    /// An editing session, by the local time of its earliest edit.
    Session(Zoned),
    /// A calendar day.
    Day(Date),
    /// Everything older than the day groups.
    EverythingElse,
    /// A single group holding the whole list.
    All(String),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(start) => {
                write!(f, "Session starting {}", start.strftime("%Y-%m-%d %H:%M"))
            }
            Self::Day(date) => write!(f, "Changes of {}", date.strftime("%Y-%m-%d")),
            Self::EverythingElse => f.write_str("Everything else"),
            Self::All(name) => f.write_str(name),
        }
    }
}
