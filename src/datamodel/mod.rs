//! # Entity graph
//!
//! Builds the typed, cross-referenced element set of one session from a
//! records document and its [`Metamodel`].
//!
//! Loading runs in two passes. The first coerces every record into an
//! [`Element`]. The second resolves relation features by id across all
//! building blocks and relationships, dropping references that point
//! nowhere. Edges are stored as [`ElementKey`]s, so cyclic data such as
//! `parent`/`children` needs no special handling.

pub(crate) mod coercion;
pub mod dates;
pub mod element;
pub mod errors;
pub mod value;

pub use dates::parse_to_instant;
pub use element::{BuildingBlockData, Element, ElementKind};
pub use errors::{DataParseError, DateParseError};
pub use value::{AttributeValue, ElementKey, Value};

use crate::constants::{ID_KEY, RECORD_GROUP_ELEMENTS_KEY, RECORD_GROUP_TYPE_KEY, UNKNOWN_ELEMENT_TEXT};
use crate::metamodel::parsing::json_text;
use crate::metamodel::{Metamodel, TypeCategory, TypeExpression, TypeKey};
use coercion::build_element;
use log::{debug, info, warn};
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Options controlling how strictly a records document is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Log and skip record groups naming an unknown type instead of failing.
    pub skip_unknown_types: bool,
}

/// All elements of one session, grouped by type and ordered by id.
#[derive(Debug)]
pub struct EntityGraph {
    metamodel: Arc<Metamodel>,
    elements: BTreeMap<TypeKey, Vec<Arc<Element>>>,
    index: HashMap<ElementKey, Arc<Element>>,
}

impl EntityGraph {
    pub fn load(
        metamodel: Arc<Metamodel>,
        document: &[u8],
        options: &LoadOptions,
    ) -> Result<Self, DataParseError> {
        let groups = match serde_json::from_slice::<Json>(document)? {
            Json::Array(groups) => groups,
            _ => return Err(DataParseError::NotAnArray),
        };

        let mut by_type: BTreeMap<TypeKey, Vec<Element>> = BTreeMap::new();
        for group in &groups {
            let Json::Object(group) = group else {
                warn!("Skipping record group that is not an object");
                continue;
            };
            let type_name = group
                .get(RECORD_GROUP_TYPE_KEY)
                .map(json_text)
                .unwrap_or_else(|| UNKNOWN_ELEMENT_TEXT.to_string());
            let Some(type_expression) = metamodel.type_expression(&type_name) else {
                if options.skip_unknown_types {
                    warn!("Skipping records of unknown type '{}'", type_name);
                    continue;
                }
                return Err(DataParseError::UnknownTypeExpression(type_name));
            };

            let records = match group.get(RECORD_GROUP_ELEMENTS_KEY) {
                Some(Json::Array(records)) => records.as_slice(),
                _ => &[],
            };
            let elements = by_type.entry(type_expression.key()).or_default();
            for record in records {
                match record {
                    Json::Object(record) => {
                        elements.push(build_element(record, type_expression, &metamodel)?)
                    }
                    other => warn!("Skipping non-object record of '{}': {}", type_name, other),
                }
            }
        }

        for (key, elements) in by_type.iter_mut() {
            elements.sort_by_key(|element| element.id);
            let before = elements.len();
            elements.dedup_by_key(|element| element.id);
            if elements.len() != before {
                warn!(
                    "Dropped {} elements of '{}' with duplicate ids",
                    before - elements.len(),
                    key
                );
            }
        }

        let ids = id_lookup(&by_type);
        for element in by_type.values_mut().flatten() {
            resolve_relations(element, &ids);
        }

        let mut graph = EntityGraph {
            metamodel,
            elements: BTreeMap::new(),
            index: HashMap::new(),
        };
        for (key, elements) in by_type {
            let elements: Vec<Arc<Element>> = elements.into_iter().map(Arc::new).collect();
            for element in &elements {
                graph
                    .index
                    .entry(element.key())
                    .or_insert_with(|| Arc::clone(element));
            }
            graph.elements.insert(key, elements);
        }

        info!(
            "Loaded {} building blocks and {} relationships for metamodel '{}'",
            graph.building_block_count(),
            graph.relationship_count(),
            graph.metamodel.version()
        );
        Ok(graph)
    }

    pub fn metamodel(&self) -> &Arc<Metamodel> {
        &self.metamodel
    }

    pub fn element(&self, key: ElementKey) -> Option<&Arc<Element>> {
        self.index.get(&key)
    }

    /// Finds an element by id, building blocks first.
    pub fn lookup_by_id(&self, id: i64) -> Option<&Arc<Element>> {
        self.element(ElementKey::building_block(id))
            .or_else(|| self.element(ElementKey::relationship(id)))
    }

    /// Elements of a type in ascending id order.
    pub fn elements_of(&self, type_expression: &TypeExpression) -> &[Arc<Element>] {
        self.elements_of_key(&type_expression.key())
    }

    pub fn elements_of_key(&self, key: &TypeKey) -> &[Arc<Element>] {
        self.elements.get(key).map_or(&[], Vec::as_slice)
    }

    /// Resolved targets of a relation feature.
    pub fn related<'a>(
        &'a self,
        element: &'a Element,
        feature: &str,
    ) -> impl Iterator<Item = &'a Arc<Element>> + 'a {
        element
            .related(feature)
            .iter()
            .filter_map(move |key| self.element(*key))
    }

    /// Substantial types that have at least one element.
    pub fn building_block_types(&self) -> Vec<&Arc<TypeExpression>> {
        self.populated_types(TypeCategory::Substantial)
    }

    /// Relationship types that have at least one element.
    pub fn relationship_types(&self) -> Vec<&Arc<TypeExpression>> {
        self.populated_types(TypeCategory::Relationship)
    }

    pub fn building_block_count(&self) -> usize {
        self.count(TypeCategory::Substantial)
    }

    pub fn relationship_count(&self) -> usize {
        self.count(TypeCategory::Relationship)
    }

    fn count(&self, category: TypeCategory) -> usize {
        self.elements
            .iter()
            .filter(|(key, _)| key.category == category)
            .map(|(_, elements)| elements.len())
            .sum()
    }

    fn populated_types(&self, category: TypeCategory) -> Vec<&Arc<TypeExpression>> {
        let mut types: Vec<_> = self
            .elements
            .iter()
            .filter(|(key, elements)| key.category == category && !elements.is_empty())
            .filter_map(|(key, _)| self.metamodel.type_by_key(key))
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }
}

/// Maps raw ids to element keys; building blocks shadow relationships.
fn id_lookup(by_type: &BTreeMap<TypeKey, Vec<Element>>) -> HashMap<i64, ElementKey> {
    let mut ids = HashMap::new();
    for category in [TypeCategory::Substantial, TypeCategory::Relationship] {
        for element in by_type
            .iter()
            .filter(|(key, _)| key.category == category)
            .flat_map(|(_, elements)| elements)
        {
            ids.entry(element.id).or_insert_with(|| element.key());
        }
    }
    ids
}

fn resolve_relations(element: &mut Element, ids: &HashMap<i64, ElementKey>) {
    let type_expression = Arc::clone(&element.type_expression);
    for feature in type_expression.features.iter().filter(|f| f.kind.is_relation()) {
        let name = &feature.persistent_name;
        let raw = element
            .additional_data
            .get(name)
            .map(|value| value.values().to_vec())
            .unwrap_or_default();

        let mut resolved = Vec::with_capacity(raw.len());
        for item in &raw {
            let Some(id) = reference_id(item) else {
                warn!("Unreadable reference in '{}' on {}: {}", name, element.uri, item);
                continue;
            };
            match ids.get(&id) {
                Some(key) => resolved.push(*key),
                None => warn!(
                    "Dropping dangling reference {} in '{}' on {}",
                    id, name, element.uri
                ),
            }
        }

        debug!(
            "Resolved {}/{} references of '{}' on {}",
            resolved.len(),
            raw.len(),
            name,
            element.uri
        );
        if element.additional_data.contains_key(name) {
            element.additional_data.insert(
                name.clone(),
                AttributeValue::List(resolved.iter().copied().map(Value::Reference).collect()),
            );
        }
        element.relationships.insert(name.clone(), resolved);
    }
}

fn reference_id(item: &Value) -> Option<i64> {
    let raw = match item {
        Value::Raw(Json::Object(reference)) => reference.get(ID_KEY)?,
        Value::Raw(other) => other,
        _ => return None,
    };
    match raw {
        Json::Number(n) => n.as_i64(),
        other => json_text(other).trim().parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metamodel() -> Arc<Metamodel> {
        let schema = json!([
            {
                "type": "SubstantialTypeExpression",
                "persistentName": "App",
                "name": "Application",
                "features": [
                    {"persistentName": "parent", "name": "Parent", "type": "App"},
                    {"persistentName": "children", "name": "Children", "type": "App", "multiple": true},
                    {"persistentName": "flows", "name": "Flows", "type": "Flow", "multiple": true}
                ]
            },
            {
                "type": "RelationshipTypeExpression",
                "persistentName": "Flow",
                "name": "Flow"
            }
        ]);
        Arc::new(Metamodel::load("v", schema.to_string().as_bytes()).unwrap())
    }

    fn data() -> Vec<u8> {
        json!([
            {
                "query": "App",
                "result": [
                    {"id": [2], "name": ["B"], "children": [{"id": 1}, {"id": 99}]},
                    {"id": [1], "name": ["A"], "parent": [{"id": 2}], "flows": [{"id": 10}]},
                    {"id": [1], "name": ["A again"]}
                ]
            },
            {"query": "Flow", "result": [{"id": [10]}]}
        ])
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_load_orders_and_dedups() {
        let graph = EntityGraph::load(metamodel(), &data(), &LoadOptions::default()).unwrap();
        let app = graph.metamodel().substantial_type("App").unwrap().clone();
        let ids: Vec<_> = graph.elements_of(&app).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(graph.lookup_by_id(1).unwrap().label(), "A");
        assert_eq!(graph.building_block_count(), 2);
        assert_eq!(graph.relationship_count(), 1);
        assert_eq!(graph.relationship_types()[0].persistent_name, "Flow");
    }

    #[test]
    fn test_cyclic_references_resolve() {
        let graph = EntityGraph::load(metamodel(), &data(), &LoadOptions::default()).unwrap();
        let a = graph.lookup_by_id(1).unwrap();
        let b = graph.lookup_by_id(2).unwrap();

        assert_eq!(a.related("parent"), &[b.key()]);
        // dangling id 99 is dropped
        assert_eq!(b.related("children"), &[a.key()]);
        assert_eq!(
            b.value("children"),
            Some(&AttributeValue::List(vec![Value::Reference(a.key())]))
        );
        let flows: Vec<_> = graph.related(a, "flows").collect();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].key(), ElementKey::relationship(10));
        assert!(b.related("flows").is_empty());
    }

    #[test]
    fn test_unknown_type_handling() {
        let document = br#"[{"query": "Ghost", "result": [{"id": [1]}]}]"#;
        let err = EntityGraph::load(metamodel(), document, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataParseError::UnknownTypeExpression(ref name) if name == "Ghost"));

        let lenient = LoadOptions {
            skip_unknown_types: true,
        };
        let graph = EntityGraph::load(metamodel(), document, &lenient).unwrap();
        assert_eq!(graph.building_block_count(), 0);
    }

    #[test]
    fn test_malformed_document() {
        let options = LoadOptions::default();
        assert!(matches!(
            EntityGraph::load(metamodel(), b"{}", &options),
            Err(DataParseError::NotAnArray)
        ));
        assert!(matches!(
            EntityGraph::load(metamodel(), b"not json", &options),
            Err(DataParseError::Json(_))
        ));
    }
}
