use crate::metamodel::{InterfaceDirection, Literal, TypeCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Identity of an element: ids are unique per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementKey {
    pub category: TypeCategory,
    pub id: i64,
}

impl ElementKey {
    pub fn building_block(id: i64) -> Self {
        Self {
            category: TypeCategory::Substantial,
            id,
        }
    }

    pub fn relationship(id: i64) -> Self {
        Self {
            category: TypeCategory::Relationship,
            id,
        }
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// A single coerced attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Instant(DateTime<Utc>),
    Decimal(f64),
    Integer(i64),
    Text(String),
    Direction(InterfaceDirection),
    Literal(Arc<Literal>),
    Reference(ElementKey),
    /// Value of a kind without a coercion rule, kept as found.
    Raw(serde_json::Value),
}

impl Value {
    /// Natural order between two values of the same shape; `None` otherwise.
    pub fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Instant(a), Value::Instant(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Direction(a), Value::Direction(b)) => Some(a.cmp(b)),
            (Value::Literal(a), Value::Literal(b)) => Some(a.name.cmp(&b.name)),
            (Value::Reference(a), Value::Reference(b)) => Some(a.id.cmp(&b.id)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Instant(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_direction(&self) -> Option<InterfaceDirection> {
        match self {
            Value::Direction(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Arc<Literal>> {
        match self {
            Value::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ElementKey> {
        match self {
            Value::Reference(key) => Some(*key),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Instant(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
            Value::Direction(d) => write!(f, "{}", d),
            Value::Literal(l) => f.write_str(&l.name),
            Value::Reference(key) => write!(f, "{}", key),
            Value::Raw(serde_json::Value::String(s)) => f.write_str(s),
            Value::Raw(other) => write!(f, "{}", other),
        }
    }
}

/// What an element holds for one key: system fields are scalars, feature
/// values are lists.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl AttributeValue {
    /// All values; a scalar is a one-element slice.
    pub fn values(&self) -> &[Value] {
        match self {
            AttributeValue::Scalar(value) => std::slice::from_ref(value),
            AttributeValue::List(values) => values,
        }
    }

    /// The single value, or the first element of a list.
    pub fn first(&self) -> Option<&Value> {
        self.values().first()
    }

    pub fn is_list(&self) -> bool {
        matches!(self, AttributeValue::List(_))
    }

    /// Number of values for rendering purposes, never below 1.
    pub fn cardinality(&self) -> usize {
        self.values().len().max(1)
    }

    /// Ordering used by sorted views.
    ///
    /// Scalars compare by their natural order. Lists compare by length, then
    /// by their first elements. Anything else is treated as equal.
    pub fn sort_cmp(&self, other: &AttributeValue) -> Ordering {
        match (self, other) {
            (AttributeValue::Scalar(a), AttributeValue::Scalar(b)) => {
                a.natural_cmp(b).unwrap_or(Ordering::Equal)
            }
            (AttributeValue::List(a), AttributeValue::List(b)) => {
                a.len().cmp(&b.len()).then_with(|| match (a.first(), b.first()) {
                    (Some(x), Some(y)) => x.natural_cmp(y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                })
            }
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Scalar(value) => write!(f, "{}", value),
            AttributeValue::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}
