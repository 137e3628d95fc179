//! # Schema model (metamodel)
//!
//! Parses a LUY `_metamodel.json` document into typed declarations:
//! substantial types, relationship types, enumerations with their literals,
//! and the features each type declares.
//!
//! ```rust
//! use luyview::metamodel::{FeatureKind, Metamodel};
//!
//! let schema = r#"[
//!   {"type": "SubstantialTypeExpression", "persistentName": "App", "name": "Application",
//!    "features": [{"persistentName": "age", "name": "Age", "type": "integer"}]}
//! ]"#;
//! let metamodel = Metamodel::load("1700000000", schema.as_bytes()).unwrap();
//! let app = metamodel.substantial_type("App").unwrap();
//! assert_eq!(app.feature("age").unwrap().kind, FeatureKind::Integer);
//! ```

pub mod enumeration;
pub mod errors;
pub mod feature;
pub(crate) mod parsing;
pub mod types;

pub use enumeration::{Color, EnumerationExpression, Literal};
pub use errors::SchemaParseError;
pub use feature::{Feature, FeatureKind, InterfaceDirection, RelationTarget};
pub use types::{TypeCategory, TypeExpression, TypeKey};

use log::{info, warn};
use parsing::{
    build_enumeration, build_type_expression, KnownTypeNames, RawDeclaration,
    ENUMERATION_CATEGORY, RELATIONSHIP_CATEGORY, SUBSTANTIAL_CATEGORY,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The type system of one exported dataset.
#[derive(Debug, Clone, Default)]
pub struct Metamodel {
    version: String,
    enumerations: BTreeMap<String, Arc<EnumerationExpression>>,
    substantial_types: BTreeMap<String, Arc<TypeExpression>>,
    relationship_types: BTreeMap<String, Arc<TypeExpression>>,
}

impl Metamodel {
    /// Parses a schema document.
    ///
    /// Declarations of an unknown category, or that cannot be read at all,
    /// are logged and skipped. Only a malformed document fails the load.
    pub fn load(version: impl Into<String>, document: &[u8]) -> Result<Self, SchemaParseError> {
        let version = version.into();
        let items = match serde_json::from_slice::<Value>(document)? {
            Value::Array(items) => items,
            _ => return Err(SchemaParseError::NotAnArray),
        };

        let mut enumerations = Vec::new();
        let mut substantial = Vec::new();
        let mut relationship = Vec::new();
        for item in items {
            let raw = match serde_json::from_value::<RawDeclaration>(item) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping unreadable metamodel declaration: {}", e);
                    continue;
                }
            };
            match raw.category.as_str() {
                ENUMERATION_CATEGORY => enumerations.push(raw),
                SUBSTANTIAL_CATEGORY => substantial.push(raw),
                RELATIONSHIP_CATEGORY => relationship.push(raw),
                other => warn!("Unknown metamodel type: {}", other),
            }
        }

        let known = KnownTypeNames {
            substantial: substantial.iter().map(|r| r.persistent_name.clone()).collect(),
            relationship: relationship.iter().map(|r| r.persistent_name.clone()).collect(),
        };

        let mut metamodel = Metamodel {
            version,
            ..Default::default()
        };
        for raw in enumerations {
            let enumeration = build_enumeration(raw);
            insert_unique(&mut metamodel.enumerations, enumeration.persistent_name.clone(), enumeration);
        }
        for raw in substantial {
            let type_expression = build_type_expression(raw, TypeCategory::Substantial, &known);
            insert_unique(
                &mut metamodel.substantial_types,
                type_expression.persistent_name.clone(),
                type_expression,
            );
        }
        for raw in relationship {
            let type_expression = build_type_expression(raw, TypeCategory::Relationship, &known);
            insert_unique(
                &mut metamodel.relationship_types,
                type_expression.persistent_name.clone(),
                type_expression,
            );
        }

        info!("{}", metamodel.summary());
        Ok(metamodel)
    }

    /// Session identifier the metamodel was loaded for.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Substantial types ordered by display name.
    pub fn substantial_types(&self) -> Vec<&Arc<TypeExpression>> {
        sorted_by_display_name(self.substantial_types.values())
    }

    /// Relationship types ordered by display name.
    pub fn relationship_types(&self) -> Vec<&Arc<TypeExpression>> {
        sorted_by_display_name(self.relationship_types.values())
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &Arc<EnumerationExpression>> {
        self.enumerations.values()
    }

    pub fn substantial_type(&self, persistent_name: &str) -> Option<&Arc<TypeExpression>> {
        self.substantial_types.get(persistent_name)
    }

    pub fn relationship_type(&self, persistent_name: &str) -> Option<&Arc<TypeExpression>> {
        self.relationship_types.get(persistent_name)
    }

    /// Looks a type up by persistent name, substantial types first.
    pub fn type_expression(&self, persistent_name: &str) -> Option<&Arc<TypeExpression>> {
        self.substantial_type(persistent_name)
            .or_else(|| self.relationship_type(persistent_name))
    }

    pub fn type_by_key(&self, key: &TypeKey) -> Option<&Arc<TypeExpression>> {
        match key.category {
            TypeCategory::Substantial => self.substantial_type(&key.persistent_name),
            TypeCategory::Relationship => self.relationship_type(&key.persistent_name),
        }
    }

    pub fn enumeration(&self, persistent_name: &str) -> Option<&Arc<EnumerationExpression>> {
        self.enumerations.get(persistent_name)
    }

    /// True iff the feature's declared type names a known substantial type.
    pub fn references_entity_type(&self, feature: &Feature) -> bool {
        self.substantial_types.contains_key(&feature.declared_type)
    }

    /// The relationship type named by the feature's declared type, if any.
    pub fn resolve_relationship_type(&self, feature: &Feature) -> Option<&Arc<TypeExpression>> {
        self.relationship_type(&feature.declared_type)
    }

    /// Features of the relationship type a (non-self) relation feature points at.
    pub fn features_of_relation(&self, feature: &Feature) -> Option<&[Arc<Feature>]> {
        if feature.kind != FeatureKind::Relation {
            return None;
        }
        self.resolve_relationship_type(feature)
            .map(|relationship| relationship.features.as_slice())
    }

    fn summary(&self) -> String {
        let mut lines = vec![format!("Loaded LUY metamodel '{}'", self.version)];
        lines.push("\tSubstantial types:".to_string());
        for t in self.substantial_types.values() {
            lines.push(format!("\t\t{} with {} features", t.persistent_name, t.features.len()));
        }
        lines.push("\tRelationship types:".to_string());
        for t in self.relationship_types.values() {
            lines.push(format!("\t\t{} with {} features", t.persistent_name, t.features.len()));
        }
        lines.push("\tEnumeration types:".to_string());
        for e in self.enumerations.values() {
            lines.push(format!("\t\t{} with {} literals", e.persistent_name, e.literals.len()));
        }
        lines.join("\n")
    }
}

fn insert_unique<T>(map: &mut BTreeMap<String, Arc<T>>, key: String, value: T) {
    if map.contains_key(&key) {
        warn!("Duplicate metamodel declaration '{}' ignored", key);
        return;
    }
    map.insert(key, Arc::new(value));
}

fn sorted_by_display_name<'a>(
    types: impl Iterator<Item = &'a Arc<TypeExpression>>,
) -> Vec<&'a Arc<TypeExpression>> {
    let mut types: Vec<_> = types.collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));
    types
}
