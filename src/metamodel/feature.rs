use crate::constants::{
    ENUMERATION_TYPE_PREFIX, ID_KEY, INTERFACE_DIRECTION_TYPE, NAME_KEY, NON_RELATION_TYPE_NAMES,
    SELF_RELATION_FEATURE_NAMES,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Closed classification of the value shape of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    Boolean,
    Date,
    DateTime,
    Decimal,
    Integer,
    RichText,
    String,
    InterfaceDirection,
    Enumeration,
    Relation,
    SelfRelation,
    BuildingBlockType,
}

impl FeatureKind {
    /// Derives the kind of a feature from its persistent name and declared type.
    pub fn derive(persistent_name: &str, declared_type: &str) -> Self {
        if SELF_RELATION_FEATURE_NAMES.contains(&persistent_name) {
            return FeatureKind::SelfRelation;
        }
        if declared_type == INTERFACE_DIRECTION_TYPE {
            return FeatureKind::InterfaceDirection;
        }
        if declared_type.starts_with(ENUMERATION_TYPE_PREFIX) {
            return FeatureKind::Enumeration;
        }
        match declared_type {
            "boolean" => FeatureKind::Boolean,
            "date" => FeatureKind::Date,
            "date_time" => FeatureKind::DateTime,
            "decimal" => FeatureKind::Decimal,
            "integer" => FeatureKind::Integer,
            "richtext" => FeatureKind::RichText,
            "string" => FeatureKind::String,
            _ => FeatureKind::Relation,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, FeatureKind::Relation | FeatureKind::SelfRelation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Boolean => "boolean",
            FeatureKind::Date => "date",
            FeatureKind::DateTime => "date_time",
            FeatureKind::Decimal => "decimal",
            FeatureKind::Integer => "integer",
            FeatureKind::RichText => "richtext",
            FeatureKind::String => "string",
            FeatureKind::InterfaceDirection => "interface_direction",
            FeatureKind::Enumeration => "enumeration",
            FeatureKind::Relation => "relation",
            FeatureKind::SelfRelation => "self_relation",
            FeatureKind::BuildingBlockType => "building_block_type",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an information flow between two interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterfaceDirection {
    NoDirection,
    FirstToSecond,
    SecondToFirst,
    BothDirections,
}

impl InterfaceDirection {
    pub const ALL: [InterfaceDirection; 4] = [
        InterfaceDirection::NoDirection,
        InterfaceDirection::FirstToSecond,
        InterfaceDirection::SecondToFirst,
        InterfaceDirection::BothDirections,
    ];

    /// Maps the export token (e.g. `FIRST_TO_SECOND`) to a direction.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "NO_DIRECTION" => Some(InterfaceDirection::NoDirection),
            "FIRST_TO_SECOND" => Some(InterfaceDirection::FirstToSecond),
            "SECOND_TO_FIRST" => Some(InterfaceDirection::SecondToFirst),
            "BOTH_DIRECTIONS" => Some(InterfaceDirection::BothDirections),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            InterfaceDirection::NoDirection => "NO_DIRECTION",
            InterfaceDirection::FirstToSecond => "FIRST_TO_SECOND",
            InterfaceDirection::SecondToFirst => "SECOND_TO_FIRST",
            InterfaceDirection::BothDirections => "BOTH_DIRECTIONS",
        }
    }
}

impl fmt::Display for InterfaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// What the declared type of a feature points at, resolved once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationTarget {
    /// The declared type is not a known type expression.
    Unresolved,
    /// The declared type names a substantial (building block) type.
    EntityType,
    /// The declared type names a relationship type.
    RelationshipType,
}

/// A named attribute or relationship slot declared on a type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub persistent_name: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub declared_type: String,
    pub kind: FeatureKind,
    pub mandatory: bool,
    pub multiple: bool,
    pub sortable: bool,
    pub relation_target: RelationTarget,
}

impl Feature {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        persistent_name: impl Into<String>,
        name: impl Into<String>,
        plural_name: impl Into<String>,
        description: impl Into<String>,
        declared_type: impl Into<String>,
        mandatory: bool,
        multiple: bool,
        relation_target: RelationTarget,
    ) -> Self {
        let persistent_name = persistent_name.into();
        let declared_type = declared_type.into();
        let kind = FeatureKind::derive(&persistent_name, &declared_type);
        let sortable = !multiple
            && (kind == FeatureKind::Enumeration
                || NON_RELATION_TYPE_NAMES.contains(&declared_type.as_str()));

        Self {
            persistent_name,
            name: name.into(),
            plural_name: plural_name.into(),
            description: description.into(),
            declared_type,
            kind,
            mandatory,
            multiple,
            sortable,
            relation_target,
        }
    }

    pub fn relation_target(&self) -> RelationTarget {
        self.relation_target
    }

    /// True iff the declared type is a known substantial type.
    pub fn references_entity_type(&self) -> bool {
        self.relation_target == RelationTarget::EntityType
    }

    /// True iff the declared type is a known relationship type.
    pub fn references_relationship_type(&self) -> bool {
        self.relation_target == RelationTarget::RelationshipType
    }

    /// `id` and `name` are always visible.
    pub fn is_pinned(&self) -> bool {
        self.persistent_name == ID_KEY || self.persistent_name == NAME_KEY
    }

    /// Display ordering: `id` first, `name` second, the rest by display name.
    pub fn display_cmp(&self, other: &Feature) -> Ordering {
        fn rank(feature: &Feature) -> u8 {
            match feature.persistent_name.as_str() {
                ID_KEY => 0,
                NAME_KEY => 1,
                _ => 2,
            }
        }

        rank(self)
            .cmp(&rank(other))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.persistent_name.cmp(&other.persistent_name))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
