//! Operator registry
//!
//! Every operator is a static entry pairing a compatibility check with an
//! evaluation function. Operators are grouped by feature kind family; the
//! same [`OperatorId`] (e.g. "equals") appears once per family with
//! family-specific semantics.

use super::value::RuleValue;
use super::Evaluatable;
use crate::datamodel::{Element, EntityGraph, Value};
use crate::metamodel::{Feature, FeatureKind, RelationTarget};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identity of an operator as offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorId {
    Equals,
    Any,
    Contains,
    StartsWith,
    EndsWith,
    ComplexAny,
    ComplexAll,
}

impl OperatorId {
    pub fn display_name(&self) -> &'static str {
        match self {
            OperatorId::Equals => "equals",
            OperatorId::Any => "any",
            OperatorId::Contains => "contains",
            OperatorId::StartsWith => "starts with",
            OperatorId::EndsWith => "ends with",
            OperatorId::ComplexAny => "any related",
            OperatorId::ComplexAll => "all related",
        }
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What an operator sees when evaluating one element.
pub struct Operand<'a> {
    pub element: &'a Element,
    pub feature: &'a Feature,
    pub graph: &'a EntityGraph,
}

impl<'a> Operand<'a> {
    /// The single value, or the first of a list.
    fn first(&self) -> Option<&'a Value> {
        self.element.first_value(&self.feature.persistent_name)
    }

    fn literal_names(&self) -> BTreeSet<&'a str> {
        self.element
            .literals(&self.feature.persistent_name)
            .iter()
            .map(|literal| literal.persistent_name.as_str())
            .collect()
    }
}

type CompatibleFn = fn(&Feature) -> bool;
type AcceptsFn = fn(&RuleValue) -> bool;
type EvaluateFn = fn(&Operand<'_>, Option<&RuleValue>) -> bool;

pub struct Operator {
    /// Unique registry key, e.g. `equals_integer`.
    pub key: &'static str,
    pub id: OperatorId,
    requires_input: bool,
    compatible: CompatibleFn,
    /// Value shapes the evaluation understands; any other value never matches.
    accepts: AcceptsFn,
    evaluate: EvaluateFn,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Whether a rule using this operator needs a value to be valid.
    pub fn requires_input(&self) -> bool {
        self.requires_input
    }

    pub fn compatible_with(&self, feature: &Feature) -> bool {
        (self.compatible)(feature)
    }

    pub fn accepts(&self, value: &RuleValue) -> bool {
        (self.accepts)(value)
    }

    pub fn evaluate(&self, operand: &Operand<'_>, against: Option<&RuleValue>) -> bool {
        (self.evaluate)(operand, against)
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Operator {}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("requires_input", &self.requires_input)
            .finish()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static OPERATORS: [Operator; 17] = [
    Operator {
        key: "equals_boolean",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Boolean,
        accepts: |v| matches!(v, RuleValue::Boolean(_)),
        evaluate: |o, against| match against {
            None => o.first().is_none(),
            Some(RuleValue::Boolean(b)) => o.first().and_then(Value::as_bool) == Some(*b),
            Some(_) => false,
        },
    },
    Operator {
        key: "any_boolean",
        id: OperatorId::Any,
        requires_input: false,
        compatible: |f| f.kind == FeatureKind::Boolean,
        accepts: |_| true,
        evaluate: |o, _| o.first().and_then(Value::as_bool).is_some(),
    },
    Operator {
        key: "equals_date",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Date,
        accepts: is_instant,
        evaluate: equals_instant,
    },
    Operator {
        key: "equals_date_time",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::DateTime,
        accepts: is_instant,
        evaluate: equals_instant,
    },
    Operator {
        key: "equals_decimal",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Decimal,
        accepts: |v| matches!(v, RuleValue::Decimal(_)),
        evaluate: |o, against| match against {
            None => o.first().is_none(),
            Some(RuleValue::Decimal(d)) => o.first().and_then(Value::as_decimal) == Some(*d),
            Some(_) => false,
        },
    },
    Operator {
        key: "equals_integer",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Integer,
        accepts: |v| matches!(v, RuleValue::Integer(_)),
        evaluate: |o, against| match against {
            None => o.first().is_none(),
            Some(RuleValue::Integer(i)) => o.first().and_then(Value::as_integer) == Some(*i),
            Some(_) => false,
        },
    },
    Operator {
        key: "any_text",
        id: OperatorId::Any,
        requires_input: false,
        compatible: is_text,
        accepts: |_| true,
        evaluate: |o, _| {
            o.first()
                .and_then(Value::as_text)
                .is_some_and(|text| !text.is_empty())
        },
    },
    Operator {
        key: "equals_text",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: is_text,
        accepts: is_text_value,
        evaluate: |o, against| text_matches(o, against, |text, needle| text == needle),
    },
    Operator {
        key: "contains_text",
        id: OperatorId::Contains,
        requires_input: true,
        compatible: is_text,
        accepts: is_text_value,
        evaluate: |o, against| text_matches(o, against, |text, needle| text.contains(needle)),
    },
    Operator {
        key: "starts_with_text",
        id: OperatorId::StartsWith,
        requires_input: true,
        compatible: is_text,
        accepts: is_text_value,
        evaluate: |o, against| text_matches(o, against, |text, needle| text.starts_with(needle)),
    },
    Operator {
        key: "ends_with_text",
        id: OperatorId::EndsWith,
        requires_input: true,
        compatible: is_text,
        accepts: is_text_value,
        evaluate: |o, against| text_matches(o, against, |text, needle| text.ends_with(needle)),
    },
    Operator {
        key: "contains_direction",
        id: OperatorId::Contains,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::InterfaceDirection,
        accepts: |v| matches!(v, RuleValue::Directions(_)),
        evaluate: |o, against| match against {
            None => o.first().is_none(),
            Some(RuleValue::Directions(accepted)) => o
                .first()
                .and_then(Value::as_direction)
                .is_some_and(|direction| accepted.contains(&direction)),
            Some(_) => false,
        },
    },
    Operator {
        key: "equals_enumeration",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Enumeration,
        accepts: |v| matches!(v, RuleValue::Literals(_)),
        evaluate: |o, against| match against {
            None => o.literal_names().is_empty(),
            Some(RuleValue::Literals(expected)) => {
                let actual = o.literal_names();
                actual.len() == expected.len()
                    && expected.iter().all(|name| actual.contains(name.as_str()))
            }
            Some(_) => false,
        },
    },
    Operator {
        key: "contains_enumeration",
        id: OperatorId::Contains,
        requires_input: true,
        compatible: |f| f.kind == FeatureKind::Enumeration,
        accepts: |v| matches!(v, RuleValue::Literals(_)),
        evaluate: |o, against| match against {
            None => o.literal_names().is_empty(),
            Some(RuleValue::Literals(accepted)) => {
                let actual = o.literal_names();
                accepted.iter().any(|name| actual.contains(name.as_str()))
            }
            Some(_) => false,
        },
    },
    Operator {
        key: "equals_reference",
        id: OperatorId::Equals,
        requires_input: true,
        compatible: |f| {
            f.kind == FeatureKind::SelfRelation
                || (f.kind == FeatureKind::Relation && f.references_entity_type())
        },
        accepts: |v| matches!(v, RuleValue::Elements(_)),
        evaluate: |o, against| {
            let related = o.element.related(&o.feature.persistent_name);
            match against {
                None => related.is_empty(),
                Some(RuleValue::Elements(accepted)) if accepted.is_empty() => related.is_empty(),
                Some(RuleValue::Elements(accepted)) => {
                    related.iter().all(|key| accepted.contains(key))
                }
                Some(_) => false,
            }
        },
    },
    Operator {
        key: "complex_any",
        id: OperatorId::ComplexAny,
        requires_input: true,
        compatible: is_navigable_relation,
        accepts: |v| matches!(v, RuleValue::Filter(_)),
        evaluate: |o, against| {
            let mut related = o.graph.related(o.element, &o.feature.persistent_name);
            match nested_filter(against) {
                Some(filter) => related.any(|target| filter.evaluate(target, o.graph)),
                None => related.next().is_some(),
            }
        },
    },
    Operator {
        key: "complex_all",
        id: OperatorId::ComplexAll,
        requires_input: true,
        compatible: is_navigable_relation,
        accepts: |v| matches!(v, RuleValue::Filter(_)),
        evaluate: |o, against| {
            let related: Vec<_> = o.graph.related(o.element, &o.feature.persistent_name).collect();
            // "all of nothing" does not match
            if related.is_empty() {
                return false;
            }
            match nested_filter(against) {
                Some(filter) => related.iter().all(|target| filter.evaluate(target, o.graph)),
                None => true,
            }
        },
    },
];

fn is_text(feature: &Feature) -> bool {
    matches!(feature.kind, FeatureKind::String | FeatureKind::RichText)
}

fn is_text_value(value: &RuleValue) -> bool {
    matches!(value, RuleValue::Text(_))
}

fn is_instant(value: &RuleValue) -> bool {
    matches!(value, RuleValue::Instant(_))
}

/// Relations whose targets can be filtered: self relations and relations to
/// a known type of either category.
fn is_navigable_relation(feature: &Feature) -> bool {
    match feature.kind {
        FeatureKind::SelfRelation => true,
        FeatureKind::Relation => feature.relation_target != RelationTarget::Unresolved,
        _ => false,
    }
}

fn equals_instant(o: &Operand<'_>, against: Option<&RuleValue>) -> bool {
    match against {
        None => o.first().is_none(),
        Some(RuleValue::Instant(t)) => o.first().and_then(Value::as_instant) == Some(*t),
        Some(_) => false,
    }
}

fn text_matches(
    o: &Operand<'_>,
    against: Option<&RuleValue>,
    predicate: fn(&str, &str) -> bool,
) -> bool {
    match against {
        None => o.first().is_none(),
        Some(RuleValue::Text(needle)) => o
            .first()
            .and_then(Value::as_text)
            .is_some_and(|text| predicate(text, needle)),
        Some(_) => false,
    }
}

fn nested_filter(against: Option<&RuleValue>) -> Option<&super::Filter> {
    match against {
        Some(RuleValue::Filter(filter)) => Some(filter.as_ref()),
        _ => None,
    }
}

/// Every registered operator.
pub fn all_operators() -> &'static [Operator] {
    &OPERATORS
}

/// Operators that may be attached to a rule on `feature`.
pub fn supported_operators(feature: &Feature) -> Vec<&'static Operator> {
    OPERATORS
        .iter()
        .filter(|operator| operator.compatible_with(feature))
        .collect()
}

/// The operator with the given id that fits `feature`, if any.
pub fn find_operator(id: OperatorId, feature: &Feature) -> Option<&'static Operator> {
    OPERATORS
        .iter()
        .find(|operator| operator.id == id && operator.compatible_with(feature))
}
