//! Engine configuration.

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use jiff::SignedDuration;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{PublishError, PublishResult};

/// How "include related resources" expands the publish list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelatedMode {
    /// One hop of modified strong relation targets, added at the top level.
    Direct,
    /// Full relation closure, nested below the resources that need them.
    #[default]
    Transitive,
}

/// Configuration for publish list assembly and grouping.
///
/// # Environment Variables
///
/// With the `config` feature every field can be set from the environment:
/// - `PUBLIST_SESSION_GAP` - gap that splits editing sessions (default: 8h)
/// - `PUBLIST_YOUNG_DAYS` - age in local days below which resources are grouped by session (default: 7)
/// - `PUBLIST_MEDIUM_DAYS` - age in local days below which resources are grouped by day (default: 28)
/// - `PUBLIST_MAX_REACHABILITY_ITERATIONS` - bound on the relation closure (default: 50)
/// - `PUBLIST_WEAK_RELATION_TYPES` - resource types whose weak relations are followed
/// - `PUBLIST_RESOURCE_LIMIT` - above this count everything lands in one group (default: 1000)
/// - `PUBLIST_RELATED_MODE` - `direct` or `transitive` (default: transitive)
/// - `PUBLIST_TIME_ZONE` - IANA zone for calendar days (default: system zone)
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[must_use = "config does nothing unless you use it"]
pub struct PublishConfig {
    /// Largest gap between consecutive edits that still counts as one session.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-gap", env = "PUBLIST_SESSION_GAP", default_value = "8h")
    )]
    #[builder(default = "default_session_gap()")]
    #[serde(default = "default_session_gap")]
    pub session_gap: SignedDuration,

    /// Resources younger than this many local days are grouped by session.
    #[cfg_attr(
        feature = "config",
        arg(long = "young-days", env = "PUBLIST_YOUNG_DAYS", default_value_t = 7)
    )]
    #[builder(default = "7")]
    #[serde(default = "default_young_days")]
    pub young_days: i64,

    /// Resources younger than this many local days are grouped by day.
    #[cfg_attr(
        feature = "config",
        arg(long = "medium-days", env = "PUBLIST_MEDIUM_DAYS", default_value_t = 28)
    )]
    #[builder(default = "28")]
    #[serde(default = "default_medium_days")]
    pub medium_days: i64,

    /// Upper bound on fixed-point iterations of the relation closure.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-reachability-iterations",
            env = "PUBLIST_MAX_REACHABILITY_ITERATIONS",
            default_value_t = 50
        )
    )]
    #[builder(default = "50")]
    #[serde(default = "default_max_iterations")]
    pub max_reachability_iterations: usize,

    /// Target types for which weak relations are followed.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "weak-relation-types",
            env = "PUBLIST_WEAK_RELATION_TYPES",
            value_delimiter = ',',
            default_value = "plain,image,pointer,binary"
        )
    )]
    #[builder(default = "default_weak_relation_types()")]
    #[serde(default = "default_weak_relation_types")]
    pub weak_relation_types: Vec<String>,

    /// Above this many resources the list is returned as one group.
    #[cfg_attr(
        feature = "config",
        arg(long = "resource-limit", env = "PUBLIST_RESOURCE_LIMIT", default_value_t = 1000)
    )]
    #[builder(default = "1000")]
    #[serde(default = "default_resource_limit")]
    pub resource_limit: usize,

    /// Expansion strategy for related resources.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "related-mode",
            env = "PUBLIST_RELATED_MODE",
            value_enum,
            default_value_t = RelatedMode::Transitive
        )
    )]
    #[builder(default)]
    #[serde(default)]
    pub related_mode: RelatedMode,

    /// IANA time zone used for calendar-day arithmetic.
    #[cfg_attr(feature = "config", arg(long = "time-zone", env = "PUBLIST_TIME_ZONE"))]
    #[builder(default)]
    #[serde(default)]
    pub time_zone: Option<String>,
}

fn default_session_gap() -> SignedDuration {
    SignedDuration::from_hours(8)
}

fn default_young_days() -> i64 {
    7
}

fn default_medium_days() -> i64 {
    28
}

fn default_max_iterations() -> usize {
    50
}

fn default_weak_relation_types() -> Vec<String> {
    ["plain", "image", "pointer", "binary"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_resource_limit() -> usize {
    1000
}

impl PublishConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let young = self.young_days.unwrap_or_else(default_young_days);
        let medium = self.medium_days.unwrap_or_else(default_medium_days);
        check_bands(young, medium)?;

        if let Some(gap) = self.session_gap
            && !gap.is_positive()
        {
            return Err("session_gap must be positive".into());
        }
        if self.max_reachability_iterations == Some(0) {
            return Err("max_reachability_iterations must be at least 1".into());
        }
        Ok(())
    }
}

fn check_bands(young: i64, medium: i64) -> Result<(), String> {
    if young < 1 {
        return Err("young_days must be at least 1".into());
    }
    if medium <= young {
        return Err(format!(
            "medium_days ({medium}) must be greater than young_days ({young})"
        ));
    }
    Ok(())
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            session_gap: default_session_gap(),
            young_days: default_young_days(),
            medium_days: default_medium_days(),
            max_reachability_iterations: default_max_iterations(),
            weak_relation_types: default_weak_relation_types(),
            resource_limit: default_resource_limit(),
            related_mode: RelatedMode::default(),
            time_zone: None,
        }
    }
}

impl PublishConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PublishConfigBuilder {
        PublishConfigBuilder::default()
    }

    /// Validates a configuration that did not go through the builder.
    pub fn validate(&self) -> PublishResult<()> {
        check_bands(self.young_days, self.medium_days).map_err(PublishError::InvalidConfig)?;
        if !self.session_gap.is_positive() {
            return Err(PublishError::InvalidConfig(
                "session_gap must be positive".into(),
            ));
        }
        if self.max_reachability_iterations == 0 {
            return Err(PublishError::InvalidConfig(
                "max_reachability_iterations must be at least 1".into(),
            ));
        }
        self.resolve_time_zone().map(|_| ())
    }

    /// Returns the time zone for calendar-day arithmetic.
    pub fn resolve_time_zone(&self) -> PublishResult<TimeZone> {
        match self.time_zone.as_deref() {
            Some(name) => TimeZone::get(name).map_err(|source| PublishError::TimeZone {
                name: name.to_owned(),
                source,
            }),
            None => Ok(TimeZone::system()),
        }
    }

    /// Returns whether weak relations to resources of this type are followed.
    pub fn follows_weak_relations_to(&self, type_name: &str) -> bool {
        self.weak_relation_types
            .iter()
            .any(|candidate| candidate == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let built = PublishConfig::builder().build().unwrap();
        assert_eq!(built, PublishConfig::default());
        assert_eq!(built.session_gap, SignedDuration::from_hours(8));
    }

    #[test]
    fn builder_rejects_inverted_bands() {
        let err = PublishConfig::builder()
            .young_days(10)
            .medium_days(5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("medium_days"));
    }

    #[test]
    fn builder_rejects_zero_iterations() {
        assert!(
            PublishConfig::builder()
                .max_reachability_iterations(0usize)
                .build()
                .is_err()
        );
    }

    #[test]
    fn resolves_named_time_zone() {
        let config = PublishConfig::builder()
            .time_zone(Some("Europe/Berlin".to_owned()))
            .build()
            .unwrap();
        assert!(config.validate().is_ok());

        let unknown = PublishConfig {
            time_zone: Some("Mars/Olympus".into()),
            ..PublishConfig::default()
        };
        assert!(matches!(
            unknown.validate(),
            Err(PublishError::TimeZone { .. })
        ));
    }

    #[test]
    fn weak_relation_allow_list() {
        let config = PublishConfig::default();
        assert!(config.follows_weak_relations_to("image"));
        assert!(!config.follows_weak_relations_to("containerpage"));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: PublishConfig =
            serde_json::from_str(r#"{ "related_mode": "direct", "young_days": 3 }"#).unwrap();
        assert_eq!(config.related_mode, RelatedMode::Direct);
        assert_eq!(config.young_days, 3);
        assert_eq!(config.medium_days, 28);
    }
}
