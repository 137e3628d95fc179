//! Raw schema declarations as found in a `_metamodel.json` document
//!
//! The export is loosely typed: text attributes may be absent or non-strings,
//! booleans may arrive as strings, and nested lists may be missing. The raw
//! structs below accept all of that and fall back to placeholders.

use super::enumeration::{Color, EnumerationExpression, Literal};
use super::feature::{Feature, RelationTarget};
use super::types::{TypeCategory, TypeExpression};
use crate::constants::UNKNOWN_PLACEHOLDER;
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) const ENUMERATION_CATEGORY: &str = "EnumerationExpression";
pub(crate) const SUBSTANTIAL_CATEGORY: &str = "SubstantialTypeExpression";
pub(crate) const RELATIONSHIP_CATEGORY: &str = "RelationshipTypeExpression";

fn unknown() -> String {
    UNKNOWN_PLACEHOLDER.to_string()
}

fn default_color() -> String {
    "rgb(0,0,0)".to_string()
}

fn default_index() -> i32 {
    -1
}

/// Renders any JSON scalar as text; strings are taken verbatim.
pub(crate) fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => unknown(),
        other => json_text(&other),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        other => json_text(&other).trim().eq_ignore_ascii_case("true"),
    })
}

fn lenient_index<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(json_text(&value).trim().parse().unwrap_or(-1))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDeclaration {
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub persistent_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub plural_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub abbreviation: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub features: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub literals: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFeature {
    #[serde(rename = "type", default = "unknown", deserialize_with = "lenient_text")]
    pub declared_type: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub persistent_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub plural_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub mandatory: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub multiple: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLiteral {
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub persistent_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub plural_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default = "default_color", deserialize_with = "lenient_text")]
    pub color: String,
    #[serde(default = "default_index", deserialize_with = "lenient_index")]
    pub index: i32,
}

/// Names of all declared types, used to classify relation features.
pub(crate) struct KnownTypeNames {
    pub substantial: HashSet<String>,
    pub relationship: HashSet<String>,
}

impl KnownTypeNames {
    fn target_of(&self, declared_type: &str) -> RelationTarget {
        if self.substantial.contains(declared_type) {
            RelationTarget::EntityType
        } else if self.relationship.contains(declared_type) {
            RelationTarget::RelationshipType
        } else {
            RelationTarget::Unresolved
        }
    }
}

pub(crate) fn build_type_expression(
    raw: RawDeclaration,
    category: TypeCategory,
    known: &KnownTypeNames,
) -> TypeExpression {
    let mut features: Vec<Arc<Feature>> = raw
        .features
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawFeature>(value) {
            Ok(feature) => Some(feature),
            Err(e) => {
                warn!(
                    "Skipping malformed feature on type '{}': {}",
                    raw.persistent_name, e
                );
                None
            }
        })
        .map(|feature| {
            let target = known.target_of(&feature.declared_type);
            Arc::new(Feature::new(
                feature.persistent_name,
                feature.name,
                feature.plural_name,
                feature.description,
                feature.declared_type,
                feature.mandatory,
                feature.multiple,
                target,
            ))
        })
        .collect();
    features.sort_by(|a, b| a.display_cmp(b));

    TypeExpression {
        category,
        persistent_name: raw.persistent_name,
        name: raw.name,
        plural_name: raw.plural_name,
        description: raw.description,
        abbreviation: raw.abbreviation,
        features,
    }
}

pub(crate) fn build_enumeration(raw: RawDeclaration) -> EnumerationExpression {
    let mut literals: Vec<Arc<Literal>> = raw
        .literals
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawLiteral>(value).ok())
        .map(|literal| {
            let color = Color::parse_rgb(&literal.color).unwrap_or_else(|| {
                warn!(
                    "Literal '{}' of '{}' has unreadable color '{}', using black",
                    literal.persistent_name, raw.persistent_name, literal.color
                );
                Color::default()
            });
            Arc::new(Literal {
                persistent_name: literal.persistent_name,
                name: literal.name,
                plural_name: literal.plural_name,
                description: literal.description,
                color,
                index: literal.index,
            })
        })
        .collect();
    literals.sort_by(|a, b| a.name.cmp(&b.name));

    EnumerationExpression {
        persistent_name: raw.persistent_name,
        name: raw.name,
        plural_name: raw.plural_name,
        description: raw.description,
        literals,
    }
}
