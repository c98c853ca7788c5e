//! Relations between resources.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use super::ResourceId;

/// Type of a relation edge.
///
/// Only the XML and JSP strong types are strong: a publish that leaves their
/// target offline breaks the source. Every other type is weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationType {
    /// Strong link from structured content.
    XmlStrong,
    /// Weak link from structured content.
    XmlWeak,
    /// Strong include from a template.
    JspStrong,
    /// Weak link from a template.
    JspWeak,
    /// Hyperlink in HTML content.
    Hyperlink,
    /// Image embedded in HTML content.
    EmbeddedImage,
    /// Category assignment.
    Category,
}

impl RelationType {
    /// Returns the strength of this relation type.
    pub const fn strength(self) -> RelationStrength {
        match self {
            Self::XmlStrong | Self::JspStrong => RelationStrength::Strong,
            _ => RelationStrength::Weak,
        }
    }

    /// Returns whether this relation type is strong.
    #[inline]
    pub const fn is_strong(self) -> bool {
        matches!(self.strength(), RelationStrength::Strong)
    }
}

/// Strength of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStrength {
    /// The source breaks when the target is missing.
    Strong,
    /// The source may break when the target is missing.
    Weak,
}

/// Which end of a relation a query starts from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationDirection {
    /// Relations whose source is the queried resource.
    #[default]
    Outgoing,
    /// Relations whose target is the queried resource.
    Incoming,
}

/// Filter for relation queries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationFilter {
    /// Direction of the relations to return.
    pub direction: RelationDirection,
    /// Restrict to one strength; `None` returns all relations.
    pub strength: Option<RelationStrength>,
}

impl RelationFilter {
    /// All outgoing relations.
    pub const fn targets() -> Self {
        Self {
            direction: RelationDirection::Outgoing,
            strength: None,
        }
    }

    /// All incoming relations.
    pub const fn sources() -> Self {
        Self {
            direction: RelationDirection::Incoming,
            strength: None,
        }
    }

    /// Restricts the filter to strong relations.
    pub const fn strong(mut self) -> Self {
        self.strength = Some(RelationStrength::Strong);
        self
    }

    /// Returns whether a relation of the given type passes the strength filter.
    pub fn accepts(&self, relation_type: RelationType) -> bool {
        self.strength
            .is_none_or(|strength| relation_type.strength() == strength)
    }
}

/// A directed relation between two resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Structure id of the source resource.
    pub source_id: ResourceId,
    /// Structure id of the target, when it could be resolved at write time.
    #[serde(default)]
    pub target_id: Option<ResourceId>,
    /// Root path of the target.
    pub target_path: String,
    /// Relation type.
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

impl Relation {
    /// Returns whether this relation is strong.
    #[inline]
    pub fn is_strong(&self) -> bool {
        self.relation_type.is_strong()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_xml_and_jsp_strong_are_strong() {
        let strong: Vec<_> = RelationType::iter().filter(|t| t.is_strong()).collect();
        assert_eq!(strong, vec![RelationType::XmlStrong, RelationType::JspStrong]);
    }

    #[test]
    fn strength_filter() {
        let filter = RelationFilter::targets().strong();
        assert!(filter.accepts(RelationType::JspStrong));
        assert!(!filter.accepts(RelationType::Hyperlink));
        assert!(RelationFilter::sources().accepts(RelationType::Hyperlink));
    }

    #[test]
    fn type_names_are_snake_case() {
        assert_eq!(RelationType::EmbeddedImage.as_ref(), "embedded_image");
        assert_eq!("xml_weak".parse::<RelationType>().unwrap(), RelationType::XmlWeak);
    }
}
