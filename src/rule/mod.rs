//! # Rule engine
//!
//! Filter expressions are trees: a [`Filter`] holds one root [`Group`],
//! groups combine [`Rule`]s and nested groups with AND, OR or NOT, and each
//! rule applies an [`Operator`] from the static registry to one feature of
//! an element.
//!
//! Two conventions differ from textbook logic and are relied upon by saved
//! filters: an empty group of any operator accepts everything, and
//! "all related" over zero related elements does not match.

pub mod errors;
pub mod filter;
pub mod group;
pub mod leaf;
pub mod operators;
pub mod value;

pub use errors::{RuleError, RuleResult};
pub use filter::Filter;
pub use group::{Group, GroupOperator, Node};
pub use leaf::Rule;
pub use operators::{
    all_operators, find_operator, supported_operators, Operand, Operator, OperatorId,
};
pub use value::RuleValue;

use crate::datamodel::{Element, EntityGraph};

/// Shared capability of filters, groups and rules.
///
/// `copy()` in the filter editor is plain [`Clone`].
pub trait Evaluatable {
    /// Whether `element` passes. Related elements are looked up in `graph`.
    fn evaluate(&self, element: &Element, graph: &EntityGraph) -> bool;

    /// Whether the expression is complete enough to be applied.
    fn is_valid(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{ElementKey, LoadOptions};
    use crate::metamodel::{Feature, Metamodel};
    use serde_json::json;
    use std::sync::Arc;

    fn graph() -> EntityGraph {
        let schema = json!([
            {
                "type": "EnumerationExpression",
                "persistentName": "io.luy.model.attribute.EnumAT.Status",
                "name": "Status",
                "literals": [
                    {"persistentName": "active", "name": "Active"},
                    {"persistentName": "planned", "name": "Planned"}
                ]
            },
            {
                "type": "SubstantialTypeExpression",
                "persistentName": "App",
                "name": "Application",
                "features": [
                    {"persistentName": "name", "name": "Name", "type": "string"},
                    {"persistentName": "age", "name": "Age", "type": "integer"},
                    {"persistentName": "live", "name": "Live", "type": "boolean"},
                    {"persistentName": "status", "name": "Status", "type": "io.luy.model.attribute.EnumAT.Status", "multiple": true},
                    {"persistentName": "children", "name": "Children", "type": "App", "multiple": true}
                ]
            }
        ]);
        let data = json!([{
            "query": "App",
            "result": [
                {"id": [1], "name": ["Foobar"], "age": [42], "live": [true], "status": ["active", "planned"],
                 "children": [{"id": 2}, {"id": 3}]},
                {"id": [2], "name": ["Barfoo"], "age": [43], "status": ["active"]},
                {"id": [3], "name": ["Baz"], "age": [], "children": []}
            ]
        }]);
        let metamodel = Metamodel::load("v", schema.to_string().as_bytes()).unwrap();
        EntityGraph::load(
            Arc::new(metamodel),
            data.to_string().as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap()
    }

    fn feature(graph: &EntityGraph, name: &str) -> Arc<Feature> {
        graph
            .metamodel()
            .substantial_type("App")
            .unwrap()
            .feature(name)
            .unwrap()
            .clone()
    }

    fn rule(graph: &EntityGraph, name: &str, id: OperatorId, value: Option<RuleValue>) -> Rule {
        let feature = feature(graph, name);
        let operator = find_operator(id, &feature).unwrap();
        Rule::new(feature, operator, value).unwrap()
    }

    fn matching(graph: &EntityGraph, predicate: &impl Evaluatable) -> Vec<i64> {
        let app = graph.metamodel().substantial_type("App").unwrap();
        graph
            .elements_of(app)
            .iter()
            .filter(|e| predicate.evaluate(e, graph))
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn test_integer_equals() {
        let graph = graph();
        let rule = rule(&graph, "age", OperatorId::Equals, Some(RuleValue::Integer(42)));
        assert_eq!(matching(&graph, &rule), vec![1]);
    }

    #[test]
    fn test_or_of_prefixes() {
        let graph = graph();
        let group = Group::or()
            .with_child(rule(&graph, "name", OperatorId::StartsWith, Some(RuleValue::from("Foo"))))
            .with_child(rule(&graph, "name", OperatorId::StartsWith, Some(RuleValue::from("Bar"))));
        assert_eq!(matching(&graph, &group), vec![1, 2]);
    }

    #[test]
    fn test_empty_groups_accept_everything() {
        let graph = graph();
        for group in [Group::and(), Group::or(), Group::not()] {
            assert_eq!(matching(&graph, &group), vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_not_truncates_to_first_child() {
        let graph = graph();
        let mut group = Group::and();
        group
            .add_child(rule(&graph, "age", OperatorId::Equals, Some(RuleValue::Integer(42))))
            .add_child(rule(&graph, "name", OperatorId::Contains, Some(RuleValue::from("a"))))
            .add_child(Group::or());
        group.set_operator(GroupOperator::Not);
        assert_eq!(group.children().len(), 1);
        assert_eq!(matching(&graph, &group), vec![2, 3]);
    }

    #[test]
    fn test_group_mutation() {
        let graph = graph();
        let a = rule(&graph, "name", OperatorId::Equals, Some(RuleValue::from("a")));
        let b = rule(&graph, "name", OperatorId::Equals, Some(RuleValue::from("b")));
        let c = rule(&graph, "name", OperatorId::Equals, Some(RuleValue::from("c")));
        let mut group = Group::and();
        group
            .add_child(b.clone())
            .add_child_first(a.clone())
            .insert_child(99, c.clone());
        assert_eq!(
            group.children(),
            &[Node::Rule(a.clone()), Node::Rule(b.clone()), Node::Rule(c.clone())]
        );
        assert_eq!(group.remove_child(1), Some(Node::Rule(b)));
        assert_eq!(group.remove_child(5), None);
        assert_eq!(group.children().len(), 2);
    }

    #[test]
    fn test_all_related_of_nothing_is_false() {
        let graph = graph();
        let everything = Filter::new(graph.metamodel().substantial_type("App").unwrap().clone());
        let all = rule(
            &graph,
            "children",
            OperatorId::ComplexAll,
            Some(RuleValue::from(everything.clone())),
        );
        assert_eq!(matching(&graph, &all), vec![1]);

        let any = rule(&graph, "children", OperatorId::ComplexAny, Some(RuleValue::from(everything)));
        assert_eq!(matching(&graph, &any), vec![1]);
    }

    #[test]
    fn test_nested_filter_on_related() {
        let graph = graph();
        let app = graph.metamodel().substantial_type("App").unwrap().clone();
        let aged = Filter::with_group(
            app,
            Group::and().with_child(rule(&graph, "age", OperatorId::Equals, Some(RuleValue::Integer(43)))),
        );
        let any = rule(&graph, "children", OperatorId::ComplexAny, Some(RuleValue::from(aged.clone())));
        let all = rule(&graph, "children", OperatorId::ComplexAll, Some(RuleValue::from(aged)));
        assert_eq!(matching(&graph, &any), vec![1]);
        assert!(matching(&graph, &all).is_empty());
    }

    #[test]
    fn test_enumeration_operators() {
        let graph = graph();
        let exact = rule(
            &graph,
            "status",
            OperatorId::Equals,
            Some(RuleValue::literals(["active"])),
        );
        assert_eq!(matching(&graph, &exact), vec![2]);

        let overlap = rule(
            &graph,
            "status",
            OperatorId::Contains,
            Some(RuleValue::literals(["planned"])),
        );
        assert_eq!(matching(&graph, &overlap), vec![1]);
    }

    #[test]
    fn test_reference_equals() {
        let graph = graph();
        let subset = rule(
            &graph,
            "children",
            OperatorId::Equals,
            Some(RuleValue::elements([
                ElementKey::building_block(2),
                ElementKey::building_block(3),
                ElementKey::building_block(7),
            ])),
        );
        // elements without references are contained in any set
        assert_eq!(matching(&graph, &subset), vec![1, 2, 3]);

        let partial = rule(
            &graph,
            "children",
            OperatorId::Equals,
            Some(RuleValue::elements([ElementKey::building_block(2)])),
        );
        assert_eq!(matching(&graph, &partial), vec![2, 3]);

        let none = rule(&graph, "children", OperatorId::Equals, None);
        assert_eq!(matching(&graph, &none), vec![2, 3]);
    }

    #[test]
    fn test_any_operators_need_no_input() {
        let graph = graph();
        let live = rule(&graph, "live", OperatorId::Any, None);
        assert!(live.is_valid());
        assert_eq!(matching(&graph, &live), vec![1]);

        let named = rule(&graph, "name", OperatorId::Any, None);
        assert_eq!(matching(&graph, &named), vec![1, 2, 3]);
    }

    #[test]
    fn test_incompatible_operator_rejected() {
        let graph = graph();
        let age = feature(&graph, "age");
        let name = feature(&graph, "name");
        let starts_with = find_operator(OperatorId::StartsWith, &name).unwrap();

        let err = Rule::new(age.clone(), starts_with, None).unwrap_err();
        assert!(matches!(err, RuleError::IncompatibleOperator { .. }));

        let mut rule = Rule::for_feature(name);
        rule.set_operator(starts_with).unwrap();
        assert!(rule.set_feature(age).is_err());
    }

    #[test]
    fn test_validity() {
        let graph = graph();
        let mut rule = Rule::for_feature(feature(&graph, "age"));
        assert!(!rule.is_valid());
        // an unset operator lets everything through
        assert_eq!(matching(&graph, &rule), vec![1, 2, 3]);

        let equals = find_operator(OperatorId::Equals, rule.feature().unwrap()).unwrap();
        rule.set_operator(equals).unwrap();
        assert!(!rule.is_valid());
        rule.set_value(42i64);
        assert!(rule.is_valid());
        // a value the operator cannot compare never matches, so it is not valid
        rule.set_value("42");
        assert!(!rule.is_valid());
        assert!(matching(&graph, &rule).is_empty());
        rule.set_value(42i64);

        let app = graph.metamodel().substantial_type("App").unwrap().clone();
        let mut filter = Filter::new(app).with_name("old apps");
        assert!(filter.is_valid());
        filter.root_mut().add_child(Rule::default());
        assert!(!filter.is_valid());
        assert_eq!(filter.name(), Some("old apps"));

        let copy = filter.clone();
        assert_eq!(copy, filter);
    }
}
