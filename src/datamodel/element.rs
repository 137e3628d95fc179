use super::value::{AttributeValue, ElementKey, Value};
use crate::metamodel::{Literal, TypeExpression};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fields carried only by building blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingBlockData {
    pub hierarchy_level: i64,
    pub name: String,
    pub description: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    BuildingBlock(BuildingBlockData),
    Relationship,
}

/// An instance of a type expression.
///
/// Elements are immutable once the graph is built. Edges to other elements
/// are held as [`ElementKey`]s and resolved through the owning graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: i64,
    pub uri: String,
    pub last_modification_time: DateTime<Utc>,
    pub last_modification_user: String,
    pub type_expression: Arc<TypeExpression>,
    /// Coerced values keyed by feature persistent name, system fields included.
    pub additional_data: BTreeMap<String, AttributeValue>,
    /// Matched literals per enumeration feature.
    pub enumerations: BTreeMap<String, Vec<Arc<Literal>>>,
    /// Resolved targets per relation feature.
    pub relationships: BTreeMap<String, Vec<ElementKey>>,
    pub kind: ElementKind,
}

impl Element {
    pub fn key(&self) -> ElementKey {
        ElementKey {
            category: self.type_expression.category,
            id: self.id,
        }
    }

    pub fn value(&self, feature: &str) -> Option<&AttributeValue> {
        self.additional_data.get(feature)
    }

    pub fn first_value(&self, feature: &str) -> Option<&Value> {
        self.value(feature).and_then(AttributeValue::first)
    }

    pub fn literals(&self, feature: &str) -> &[Arc<Literal>] {
        self.enumerations.get(feature).map_or(&[], Vec::as_slice)
    }

    pub fn related(&self, feature: &str) -> &[ElementKey] {
        self.relationships.get(feature).map_or(&[], Vec::as_slice)
    }

    pub fn building_block(&self) -> Option<&BuildingBlockData> {
        match &self.kind {
            ElementKind::BuildingBlock(data) => Some(data),
            ElementKind::Relationship => None,
        }
    }

    /// Building block name, or the URI for relationships.
    pub fn label(&self) -> &str {
        match &self.kind {
            ElementKind::BuildingBlock(data) => &data.name,
            ElementKind::Relationship => &self.uri,
        }
    }

    /// Largest number of values held under any key, at least 1.
    pub fn max_values(&self) -> usize {
        self.additional_data
            .values()
            .map(AttributeValue::cardinality)
            .max()
            .unwrap_or(1)
    }
}
