use super::feature::Feature;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Category of a type expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeCategory {
    /// Entity type whose instances are building blocks.
    Substantial,
    /// Edge type whose instances are relationships.
    Relationship,
}

/// Identity of a type expression: persistent names are unique per category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    pub category: TypeCategory,
    pub persistent_name: String,
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.persistent_name)
    }
}

/// A substantial or relationship type with its ordered features.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpression {
    pub category: TypeCategory,
    pub persistent_name: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub abbreviation: String,
    /// Features in display order (`id`, `name`, then by display name).
    pub features: Vec<Arc<Feature>>,
}

impl TypeExpression {
    pub fn key(&self) -> TypeKey {
        TypeKey {
            category: self.category,
            persistent_name: self.persistent_name.clone(),
        }
    }

    pub fn is_substantial(&self) -> bool {
        self.category == TypeCategory::Substantial
    }

    pub fn feature(&self, persistent_name: &str) -> Option<&Arc<Feature>> {
        self.features
            .iter()
            .find(|feature| feature.persistent_name == persistent_name)
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
